//! Progress reporting hooks.
//!
//! The pipeline announces each stage and its outcome as it happens, so a
//! front end can print status lines while a slow connect is still pending.

use crate::report::{DiagnosticOutcome, PipelineStage};

/// Receives progress from a diagnostic run.
pub trait Reporter {
    /// A stage is about to run.
    fn stage_started(&mut self, stage: PipelineStage, message: &str);

    /// Additional information within the current stage.
    fn info(&mut self, message: &str);

    /// A stage finished.
    fn outcome(&mut self, outcome: &DiagnosticOutcome);
}

/// Reporter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn stage_started(&mut self, _stage: PipelineStage, _message: &str) {}

    fn info(&mut self, _message: &str) {}

    fn outcome(&mut self, _outcome: &DiagnosticOutcome) {}
}

/// A single reported event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    /// See [`Reporter::stage_started`].
    Started(PipelineStage, String),
    /// See [`Reporter::info`].
    Info(String),
    /// See [`Reporter::outcome`].
    Outcome(DiagnosticOutcome),
}

/// Reporter that keeps every event, in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
    /// Events received so far.
    pub events: Vec<ReportEvent>,
}

impl RecordingReporter {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages that were started, in order.
    pub fn started_stages(&self) -> Vec<PipelineStage> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ReportEvent::Started(stage, _) => Some(*stage),
                _ => None,
            })
            .collect()
    }

    /// Info messages, in order.
    pub fn infos(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ReportEvent::Info(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn stage_started(&mut self, stage: PipelineStage, message: &str) {
        self.events
            .push(ReportEvent::Started(stage, message.to_string()));
    }

    fn info(&mut self, message: &str) {
        self.events.push(ReportEvent::Info(message.to_string()));
    }

    fn outcome(&mut self, outcome: &DiagnosticOutcome) {
        self.events.push(ReportEvent::Outcome(outcome.clone()));
    }
}
