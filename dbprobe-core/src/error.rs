//! Error types for the diagnostic pipeline.
//!
//! Every stage of the pipeline returns a [`ProbeResult`]. The pipeline turns
//! each error into a stage-labelled [`DiagnosticOutcome`](crate::DiagnosticOutcome),
//! so none of these ever escape [`Pipeline::run`](crate::Pipeline::run).
//!
//! ```rust
//! use dbprobe_core::{FailureClass, ProbeError};
//!
//! let err = ProbeError::malformed("missing port number in Oracle URL");
//! assert_eq!(err.failure_class(), FailureClass::InvalidConnectionString);
//! assert!(err.to_string().contains("missing port"));
//! ```

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::dialect::Dialect;
use crate::report::{FailureClass, SqlErrorDetail};

/// Result type for pipeline operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can end a diagnostic run.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The connection string does not start with a recognized vendor prefix.
    #[error("unsupported connection string: {0}")]
    UnsupportedDialect(String),

    /// The connection string matched a dialect but its grammar was violated.
    #[error("malformed connection string: {reason}")]
    MalformedConnectionString {
        /// What was wrong with the string.
        reason: String,
    },

    /// No session factory is compiled in for the dialect.
    #[error("driver {driver} is not available for {dialect}")]
    DriverLoadFailure {
        /// Dialect that was requested.
        dialect: Dialect,
        /// Vendor driver identifier.
        driver: &'static str,
    },

    /// A database-level failure, with every record of the vendor error chain.
    #[error("database error while {operation} ({} linked error(s))", .details.len())]
    ChainedDatabaseError {
        /// Operation that failed.
        operation: DbOperation,
        /// Error records in chain order.
        details: Vec<SqlErrorDetail>,
    },

    /// The query file could not be read.
    #[error("cannot read SQL file {}: {source}", .path.display())]
    QueryFileReadFailure {
        /// Path that was given.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ProbeError {
    /// Create a malformed connection string error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedConnectionString {
            reason: reason.into(),
        }
    }

    /// Create a chained database error.
    pub fn database(operation: DbOperation, details: Vec<SqlErrorDetail>) -> Self {
        Self::ChainedDatabaseError { operation, details }
    }

    /// Create a driver load failure for a dialect.
    pub fn driver_unavailable(dialect: Dialect) -> Self {
        Self::DriverLoadFailure {
            dialect,
            driver: dialect.driver_id(),
        }
    }

    /// Failure class used for reporting and exit codes.
    pub fn failure_class(&self) -> FailureClass {
        match self {
            Self::UnsupportedDialect(_) | Self::MalformedConnectionString { .. } => {
                FailureClass::InvalidConnectionString
            }
            Self::DriverLoadFailure { .. } => FailureClass::DriverUnavailable,
            Self::ChainedDatabaseError {
                operation: DbOperation::Connect,
                ..
            } => FailureClass::ConnectionFailed,
            Self::ChainedDatabaseError { .. } => FailureClass::QueryFailed,
            Self::QueryFileReadFailure { .. } => FailureClass::QueryFileUnreadable,
        }
    }

    /// Chained error records carried by this error, if any.
    pub fn chained_errors(&self) -> &[SqlErrorDetail] {
        match self {
            Self::ChainedDatabaseError { details, .. } => details,
            _ => &[],
        }
    }
}

/// Database operation a chained error was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DbOperation {
    /// Opening the session.
    Connect,
    /// Executing the verification query.
    Query,
    /// Closing the session.
    Close,
}

impl fmt::Display for DbOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connecting"),
            Self::Query => write!(f, "executing query"),
            Self::Close => write!(f, "closing session"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_classes() {
        assert_eq!(
            ProbeError::UnsupportedDialect("invalid:url".into()).failure_class(),
            FailureClass::InvalidConnectionString
        );
        assert_eq!(
            ProbeError::driver_unavailable(Dialect::Oracle).failure_class(),
            FailureClass::DriverUnavailable
        );
        assert_eq!(
            ProbeError::database(DbOperation::Connect, vec![]).failure_class(),
            FailureClass::ConnectionFailed
        );
        assert_eq!(
            ProbeError::database(DbOperation::Query, vec![]).failure_class(),
            FailureClass::QueryFailed
        );
    }

    #[test]
    fn test_error_display() {
        let err = ProbeError::driver_unavailable(Dialect::Oracle);
        assert_eq!(
            err.to_string(),
            "driver oracle.jdbc.OracleDriver is not available for Oracle"
        );

        let err = ProbeError::database(DbOperation::Connect, vec![SqlErrorDetail::new("boom")]);
        assert_eq!(
            err.to_string(),
            "database error while connecting (1 linked error(s))"
        );
        assert_eq!(err.chained_errors().len(), 1);
    }

    #[test]
    fn test_query_file_error_source() {
        let err = ProbeError::QueryFileReadFailure {
            path: PathBuf::from("/nope.sql"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().starts_with("cannot read SQL file /nope.sql"));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.failure_class(), FailureClass::QueryFileUnreadable);
    }
}
