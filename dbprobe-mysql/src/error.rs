//! Error types for MySQL operations.

use dbprobe_core::{DbOperation, ProbeError, SqlErrorDetail};
use thiserror::Error;

/// Result type for MySQL operations.
pub type MysqlResult<T> = Result<T, MysqlError>;

/// Error type for MySQL operations.
#[derive(Error, Debug)]
pub enum MysqlError {
    /// MySQL driver error.
    #[error("MySQL error: {0}")]
    Mysql(#[from] mysql_async::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Query error.
    #[error("Query error: {0}")]
    Query(String),
}

impl MysqlError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Check if the server itself reported this error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Mysql(mysql_async::Error::Server(_)))
    }

    /// Collect the error chain, one record per link.
    ///
    /// Server errors carry the MySQL error code and SQLSTATE.
    pub fn chain(&self) -> Vec<SqlErrorDetail> {
        match self {
            Self::Mysql(mysql_async::Error::Server(server)) => {
                let head = SqlErrorDetail::new(server.message.clone())
                    .with_sql_state(server.state.clone())
                    .with_error_code(i64::from(server.code));
                SqlErrorDetail::collect_chain(head, None)
            }
            Self::Mysql(e) => SqlErrorDetail::chain_from(e),
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
    fn test_server_error_chain() {
        let err = MysqlError::from(mysql_async::Error::Server(mysql_async::ServerError {
            code: 1045,
            message: "Access denied for user 'app'@'localhost' (using password: YES)".into(),
            state: "28000".into(),
        }));
        assert!(err.is_server_error());

        let chain = err.chain();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].error_code, 1045);
        assert_eq!(chain[0].sql_state.as_deref(), Some("28000"));
        assert!(chain[0].message.starts_with("Access denied"));
    }

    #[test]
    fn test_into_probe_error() {
        let err = MysqlError::config("missing host in URL").into_probe_error(DbOperation::Connect);
        assert_eq!(err.failure_class(), FailureClass::ConnectionFailed);
        assert_eq!(
            err.chained_errors()[0].message,
            "Configuration error: missing host in URL"
        );

        let err = MysqlError::query("unsupported value").into_probe_error(DbOperation::Query);
        assert_eq!(err.failure_class(), FailureClass::QueryFailed);
    }
}
