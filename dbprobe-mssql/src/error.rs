//! Error types for Microsoft SQL Server operations.

use dbprobe_core::{DbOperation, ProbeError, SqlErrorDetail};
use thiserror::Error;

/// Result type for SQL Server operations.
pub type MssqlResult<T> = Result<T, MssqlError>;

/// Errors that can occur during SQL Server operations.
#[derive(Error, Debug)]
pub enum MssqlError {
    /// Tiberius error.
    #[error("SQL Server error: {0}")]
    Tiberius(#[from] tiberius::error::Error),

    /// Socket error before the TDS handshake.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The first column has a type that cannot be rendered.
    #[error("type conversion error: {0}")]
    TypeConversion(String),
}

impl MssqlError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a type conversion error.
    pub fn type_conversion(message: impl Into<String>) -> Self {
        Self::TypeConversion(message.into())
    }

    /// Check if the server itself reported this error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Tiberius(tiberius::error::Error::Server(_)))
    }

    /// Collect the error chain, one record per link.
    ///
    /// Server token errors carry the error number and state.
    pub fn chain(&self) -> Vec<SqlErrorDetail> {
        match self {
            Self::Tiberius(tiberius::error::Error::Server(token)) => {
                let head = SqlErrorDetail::new(token.message())
                    .with_sql_state(token.state().to_string())
                    .with_error_code(i64::from(token.code()))
                    .with_cause(format!("server {} class {}", token.server(), token.class()));
                SqlErrorDetail::collect_chain(head, None)
            }
            Self::Tiberius(e) => SqlErrorDetail::chain_from(e),
            Self::Io(e) => SqlErrorDetail::chain_from(e),
            other => vec![SqlErrorDetail::new(other.to_string())],
        }
    }

    /// Convert into a pipeline error for `operation`.
    pub fn into_probe_error(self, operation: DbOperation) -> ProbeError {
        ProbeError::database(operation, self.chain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbprobe_core::FailureClass;

    #[test]
    fn test_error_creation() {
        let err = MssqlError::config("missing host in URL");
        assert!(matches!(err, MssqlError::Config(_)));
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_io_error_chain() {
        let err = MssqlError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        let chain = err.chain();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].message, "connection refused");
        assert_eq!(chain[0].sql_state, None);
    }

    #[test]
    fn test_into_probe_error() {
        let err = MssqlError::config("bad").into_probe_error(DbOperation::Connect);
        assert_eq!(err.failure_class(), FailureClass::ConnectionFailed);

        let err = MssqlError::type_conversion("image").into_probe_error(DbOperation::Query);
        assert_eq!(err.failure_class(), FailureClass::QueryFailed);
        assert_eq!(
            err.chained_errors()[0].message,
            "type conversion error: image"
        );
    }
}
