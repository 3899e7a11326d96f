//! # dbprobe-core
//!
//! Vendor-independent core of the dbprobe connectivity diagnoser.
//!
//! This crate provides:
//! - Dialect resolution from JDBC-style connection strings
//! - Host/port extraction for Oracle, MySQL, PostgreSQL and SQL Server URLs
//! - A bounded TCP reachability probe
//! - The staged diagnostic pipeline and its structured report
//! - The [`SessionFactory`]/[`Session`] seam that vendor crates implement
//!
//! ## Example
//!
//! ```rust
//! use dbprobe_core::{ConnectionString, Dialect};
//!
//! let conn = ConnectionString::parse("jdbc:oracle:thin:@//db.example.com:1521/ORCL").unwrap();
//! assert_eq!(conn.dialect(), Dialect::Oracle);
//! assert_eq!(conn.target().host, "db.example.com");
//! assert_eq!(conn.target().port, 1521);
//! ```

pub mod dialect;
pub mod error;
pub mod logging;
pub mod mask;
pub mod parser;
pub mod pipeline;
pub mod probe;
pub mod report;
pub mod reporter;
pub mod session;

pub use dialect::{Dialect, strip_jdbc_label};
pub use error::{DbOperation, ProbeError, ProbeResult};
pub use mask::mask_url;
pub use parser::{ConnectionString, ConnectionTarget, parse};
pub use pipeline::{Pipeline, ProbeConfig, ProbeRequest, read_query_file};
pub use probe::{DEFAULT_PROBE_TIMEOUT, probe};
pub use report::{
    DiagnosticOutcome, DiagnosticReport, FailureClass, PipelineStage, SqlErrorDetail, Status,
    render_chain,
};
pub use reporter::{RecordingReporter, ReportEvent, Reporter, SilentReporter};
pub use session::{ConnectRequest, DriverRegistry, Session, SessionFactory};

// Re-exported for vendor crates implementing the session traits.
pub use async_trait::async_trait;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::dialect::Dialect;
    pub use crate::error::{ProbeError, ProbeResult};
    pub use crate::parser::{ConnectionString, ConnectionTarget};
    pub use crate::pipeline::{Pipeline, ProbeConfig, ProbeRequest};
    pub use crate::report::{DiagnosticOutcome, DiagnosticReport, FailureClass, PipelineStage};
    pub use crate::reporter::Reporter;
    pub use crate::session::{DriverRegistry, Session, SessionFactory};
}
