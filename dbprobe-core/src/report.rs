//! Diagnostic outcomes and chained error records.
//!
//! A run produces a [`DiagnosticReport`]: one [`DiagnosticOutcome`] per stage
//! that was attempted, in pipeline order, and the [`FailureClass`] of the
//! stage that ended the run (if any).
//!
//! Vendor APIs often raise several linked error records for one failure.
//! Those are collected eagerly into a `Vec<SqlErrorDetail>`:
//!
//! ```rust
//! use dbprobe_core::SqlErrorDetail;
//!
//! let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
//! let chain = SqlErrorDetail::chain_from(&io);
//! assert_eq!(chain.len(), 1);
//! assert_eq!(chain[0].message, "connection refused");
//! ```

use std::error::Error as StdError;
use std::fmt::{self, Write as _};

use serde::Serialize;

use crate::dialect::Dialect;
use crate::parser::ConnectionTarget;

/// Stage of the diagnostic pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Resolve the dialect and extract host/port.
    ParseUrl,
    /// Open a bounded-timeout TCP connection.
    ProbeNetwork,
    /// Select the compiled-in session factory.
    LoadDriver,
    /// Open a database session.
    Connect,
    /// Run the verification query.
    ExecuteQuery,
}

impl PipelineStage {
    /// All stages, in order.
    pub const ALL: [PipelineStage; 5] = [
        PipelineStage::ParseUrl,
        PipelineStage::ProbeNetwork,
        PipelineStage::LoadDriver,
        PipelineStage::Connect,
        PipelineStage::ExecuteQuery,
    ];

    /// 1-based position of the stage.
    pub fn number(&self) -> usize {
        *self as usize + 1
    }

    /// Short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ParseUrl => "Parsing connection string",
            Self::ProbeNetwork => "Testing network connectivity",
            Self::LoadDriver => "Loading driver",
            Self::Connect => "Connecting to database",
            Self::ExecuteQuery => "Executing test query",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Status marker of an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The stage passed.
    Success,
    /// The stage failed and ended the run.
    Failure,
    /// The stage passed with a caveat (the query returned no rows).
    Warning,
}

impl Status {
    /// Terminal marker for the status.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Success => "✔",
            Self::Failure => "✖",
            Self::Warning => "⚠",
        }
    }
}

/// Category of a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// Unsupported dialect or malformed connection string.
    InvalidConnectionString,
    /// The network probe could not reach host:port.
    UnreachableHost,
    /// No session factory for the dialect.
    DriverUnavailable,
    /// The database refused or failed the session.
    ConnectionFailed,
    /// The verification query failed.
    QueryFailed,
    /// The query file could not be read.
    QueryFileUnreadable,
}

impl FailureClass {
    /// Stage at which this class of failure occurs.
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::InvalidConnectionString => PipelineStage::ParseUrl,
            Self::UnreachableHost => PipelineStage::ProbeNetwork,
            Self::DriverUnavailable => PipelineStage::LoadDriver,
            Self::ConnectionFailed => PipelineStage::Connect,
            Self::QueryFailed | Self::QueryFileUnreadable => PipelineStage::ExecuteQuery,
        }
    }
}

/// One record of a vendor error chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SqlErrorDetail {
    /// SQLSTATE (or vendor state code), when the record carries one.
    pub sql_state: Option<String>,
    /// Vendor numeric error code (0 when the vendor has none).
    pub error_code: i64,
    /// Error message.
    pub message: String,
    /// Immediate cause, rendered as text.
    pub cause: Option<String>,
}

impl SqlErrorDetail {
    /// Create a record with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            sql_state: None,
            error_code: 0,
            message: message.into(),
            cause: None,
        }
    }

    /// Set the SQL state.
    pub fn with_sql_state(mut self, state: impl Into<String>) -> Self {
        self.sql_state = Some(state.into());
        self
    }

    /// Set the vendor error code.
    pub fn with_error_code(mut self, code: i64) -> Self {
        self.error_code = code;
        self
    }

    /// Set the immediate cause.
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// One record per link of `err`'s source chain, starting at `err`.
    pub fn chain_from(err: &(dyn StdError + 'static)) -> Vec<Self> {
        let head = Self::new(err.to_string());
        Self::collect_chain(head, err.source())
    }

    /// Prepend a vendor-specific `head` record to the records of `rest`.
    ///
    /// The head's cause defaults to the message of the first link of `rest`.
    pub fn collect_chain(mut head: Self, rest: Option<&(dyn StdError + 'static)>) -> Vec<Self> {
        if head.cause.is_none() {
            head.cause = rest.map(|e| e.to_string());
        }
        let mut chain = vec![head];
        let mut current = rest;
        while let Some(err) = current {
            let next = err.source();
            chain.push(Self {
                sql_state: None,
                error_code: 0,
                message: err.to_string(),
                cause: next.map(|e| e.to_string()),
            });
            current = next;
        }
        chain
    }
}

impl fmt::Display for SqlErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SQL State: {}", self.sql_state.as_deref().unwrap_or("none"))?;
        writeln!(f, "Error Code: {}", self.error_code)?;
        writeln!(f, "Message: {}", self.message)?;
        write!(f, "Cause: {}", self.cause.as_deref().unwrap_or("none"))
    }
}

/// Render a chain as numbered blocks, starting at `Error #1`.
pub fn render_chain(details: &[SqlErrorDetail]) -> String {
    let mut out = String::new();
    for (i, detail) in details.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "Error #{}", i + 1);
        let _ = writeln!(out, "{}", detail);
    }
    out
}

/// Result of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticOutcome {
    /// Stage this outcome belongs to.
    pub stage: PipelineStage,
    /// Status marker.
    pub status: Status,
    /// Human-readable detail line.
    pub detail: String,
    /// Chained database error records, for database-level failures.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chained_errors: Vec<SqlErrorDetail>,
}

impl DiagnosticOutcome {
    /// A passed stage.
    pub fn passed(stage: PipelineStage, detail: impl Into<String>) -> Self {
        Self {
            stage,
            status: Status::Success,
            detail: detail.into(),
            chained_errors: Vec::new(),
        }
    }

    /// A stage that passed with a warning.
    pub fn warning(stage: PipelineStage, detail: impl Into<String>) -> Self {
        Self {
            stage,
            status: Status::Warning,
            detail: detail.into(),
            chained_errors: Vec::new(),
        }
    }

    /// A failed stage.
    pub fn failed(stage: PipelineStage, detail: impl Into<String>) -> Self {
        Self {
            stage,
            status: Status::Failure,
            detail: detail.into(),
            chained_errors: Vec::new(),
        }
    }

    /// Attach chained error records.
    pub fn with_chained_errors(mut self, errors: Vec<SqlErrorDetail>) -> Self {
        self.chained_errors = errors;
        self
    }

    /// Whether the stage passed (a warning still counts as passed).
    pub fn success(&self) -> bool {
        self.status != Status::Failure
    }
}

/// Everything one diagnostic run produced.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    /// Connection string that was diagnosed, passwords masked.
    pub url: String,
    /// Resolved dialect, once `ParseUrl` passed.
    pub dialect: Option<Dialect>,
    /// Extracted target, once `ParseUrl` passed.
    pub target: Option<ConnectionTarget>,
    /// Outcomes in stage order.
    pub outcomes: Vec<DiagnosticOutcome>,
    /// Failure that ended the run.
    pub failure: Option<FailureClass>,
}

impl DiagnosticReport {
    /// Start an empty report for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            dialect: None,
            target: None,
            outcomes: Vec::new(),
            failure: None,
        }
    }

    /// Whether every attempted stage passed.
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Whether any outcome carries a warning.
    pub fn has_warnings(&self) -> bool {
        self.outcomes.iter().any(|o| o.status == Status::Warning)
    }

    /// The failed outcome, if the run failed.
    pub fn failed_outcome(&self) -> Option<&DiagnosticOutcome> {
        self.outcomes.iter().find(|o| o.status == Status::Failure)
    }

    /// Stage at which the run stopped, if it failed.
    pub fn failed_stage(&self) -> Option<PipelineStage> {
        self.failure.map(|f| f.stage())
    }

    /// Outcome recorded for `stage`, if it was attempted.
    pub fn outcome(&self, stage: PipelineStage) -> Option<&DiagnosticOutcome> {
        self.outcomes.iter().find(|o| o.stage == stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct Wrapped {
        inner: std::io::Error,
    }

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "error connecting to server")
        }
    }

    impl StdError for Wrapped {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.inner)
        }
    }

    #[test]
    fn test_stage_order() {
        let numbers: Vec<_> = PipelineStage::ALL.iter().map(|s| s.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert!(PipelineStage::ParseUrl < PipelineStage::ExecuteQuery);
    }

    #[test]
    fn test_chain_from_walks_sources() {
        let err = Wrapped {
            inner: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };
        let chain = SqlErrorDetail::chain_from(&err);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].message, "error connecting to server");
        assert_eq!(chain[0].cause.as_deref(), Some("refused"));
        assert_eq!(chain[1].message, "refused");
        assert_eq!(chain[1].cause, None);
    }

    #[test]
    fn test_collect_chain_keeps_vendor_head() {
        let head = SqlErrorDetail::new("password authentication failed for user \"app\"")
            .with_sql_state("28P01")
            .with_cause("FATAL");
        let chain = SqlErrorDetail::collect_chain(head, None);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].sql_state.as_deref(), Some("28P01"));
        assert_eq!(chain[0].cause.as_deref(), Some("FATAL"));
    }

    #[test]
    fn test_render_chain() {
        let chain = vec![
            SqlErrorDetail::new("Login failed for user 'sa'.")
                .with_sql_state("1")
                .with_error_code(18456),
            SqlErrorDetail::new("second"),
        ];
        let text = render_chain(&chain);
        assert!(text.starts_with("Error #1\nSQL State: 1\nError Code: 18456\n"));
        assert!(text.contains("Error #2\nSQL State: none\nError Code: 0\nMessage: second\nCause: none"));
    }

    #[test]
    fn test_failure_class_stage() {
        assert_eq!(
            FailureClass::QueryFileUnreadable.stage(),
            PipelineStage::ExecuteQuery
        );
        assert_eq!(
            FailureClass::UnreachableHost.stage(),
            PipelineStage::ProbeNetwork
        );
    }

    #[test]
    fn test_outcome_success() {
        assert!(DiagnosticOutcome::passed(PipelineStage::Connect, "ok").success());
        assert!(DiagnosticOutcome::warning(PipelineStage::ExecuteQuery, "no rows").success());
        assert!(!DiagnosticOutcome::failed(PipelineStage::Connect, "no").success());
    }

    #[test]
    fn test_report_serializes() {
        let mut report = DiagnosticReport::new("jdbc:mysql://localhost/test");
        report.dialect = Some(Dialect::MySql);
        report
            .outcomes
            .push(DiagnosticOutcome::failed(PipelineStage::ProbeNetwork, "refused"));
        report.failure = Some(FailureClass::UnreachableHost);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["dialect"], "mysql");
        assert_eq!(json["failure"], "unreachable_host");
        assert_eq!(json["outcomes"][0]["stage"], "probe_network");
        assert_eq!(json["outcomes"][0]["status"], "failure");
        assert!(json["outcomes"][0].get("chained_errors").is_none());
    }
}
