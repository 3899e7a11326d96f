//! Console rendering of pipeline progress.

use dbprobe::{DiagnosticOutcome, PipelineStage, Reporter, Status, render_chain};

use crate::output;

/// Prints each stage as it starts and finishes.
///
/// Success and warning lines go to stdout; failures and their chained error
/// records go to stderr.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// Create a console reporter
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for ConsoleReporter {
    fn stage_started(&mut self, stage: PipelineStage, message: &str) {
        output::newline();
        output::step(stage.number(), PipelineStage::ALL.len(), message);
    }

    fn info(&mut self, message: &str) {
        output::info(message);
    }

    fn outcome(&mut self, outcome: &DiagnosticOutcome) {
        match outcome.status {
            Status::Success => output::success(&outcome.detail),
            Status::Warning => output::warn(&outcome.detail),
            Status::Failure => {
                output::error(&outcome.detail);
                if !outcome.chained_errors.is_empty() {
                    output::detail(&render_chain(&outcome.chained_errors));
                }
            }
        }
    }
}
