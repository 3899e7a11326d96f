//! # dbprobe-mssql
//!
//! Microsoft SQL Server session factory for dbprobe, built on `tiberius`
//! running over tokio through the `tokio-util` compat layer.
//!
//! Connection strings use the JDBC form
//! `jdbc:sqlserver://host[\instance][:port][;key=value]*`. Named instances
//! are addressed by explicit port; SQL Browser lookup is not performed.
//!
//! ```rust
//! use dbprobe_mssql::MssqlConfig;
//!
//! let config = MssqlConfig::from_url(
//!     "jdbc:sqlserver://localhost:1433;databaseName=test;trustServerCertificate=true",
//! )
//! .unwrap();
//! assert_eq!(config.database.as_deref(), Some("test"));
//! assert!(config.trust_cert);
//! ```

pub mod config;
pub mod error;
pub mod session;

pub use config::{EncryptionMode, MssqlConfig};
pub use error::{MssqlError, MssqlResult};
pub use session::{MssqlSession, MssqlSessionFactory};
