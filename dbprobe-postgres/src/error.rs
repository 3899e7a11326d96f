//! Error types for PostgreSQL operations.

use dbprobe_core::{DbOperation, ProbeError, SqlErrorDetail};
use thiserror::Error;

/// Result type for PostgreSQL operations.
pub type PgResult<T> = Result<T, PgError>;

/// Errors that can occur during PostgreSQL operations.
#[derive(Error, Debug)]
pub enum PgError {
    /// PostgreSQL error.
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The first column has a type that cannot be rendered.
    #[error("type conversion error: {0}")]
    TypeConversion(String),
}

impl PgError {
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
        matches!(self, Self::Postgres(e) if e.as_db_error().is_some())
    }

    /// Collect the error chain, one record per link.
    ///
    /// Server errors lead with the SQLSTATE and message; the detail (or hint)
    /// becomes the cause.
    pub fn chain(&self) -> Vec<SqlErrorDetail> {
        match self {
            Self::Postgres(e) => match e.as_db_error() {
                Some(db) => {
                    let mut head = SqlErrorDetail::new(format!("{}: {}", db.severity(), db.message()))
                        .with_sql_state(db.code().code());
                    if let Some(cause) = db.detail().or(db.hint()) {
                        head = head.with_cause(cause);
                    }
                    SqlErrorDetail::collect_chain(head, None)
                }
                None => SqlErrorDetail::chain_from(e),
            },
            other => vec![SqlErrorDetail::new(other.to_string())],
        }
    }

    /// Convert into a pipeline error for `operation`.
    pub fn into_probe_error(self, operation: DbOperation) -> ProbeError {
        ProbeError::database(operation, self.chain())
    }
}
