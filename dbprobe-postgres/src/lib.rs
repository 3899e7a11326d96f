//! # dbprobe-postgres
//!
//! PostgreSQL session factory for dbprobe, built on `tokio-postgres`.
//!
//! This crate provides:
//! - [`PgConfig`], parsed from a JDBC-style `postgresql://` URL
//! - [`PgSessionFactory`], registered in a `DriverRegistry` for
//!   `Dialect::PostgreSql`
//! - [`PgError`], converted into chained `SqlErrorDetail` records
//!
//! ## Example
//!
//! ```rust
//! use dbprobe_core::{Dialect, DriverRegistry};
//! use dbprobe_postgres::PgSessionFactory;
//!
//! let registry = DriverRegistry::new().register(PgSessionFactory::new());
//! assert!(registry.is_available(Dialect::PostgreSql));
//! ```

pub mod config;
pub mod error;
pub mod session;

pub use config::{PgConfig, SslMode};
pub use error::{PgError, PgResult};
pub use session::{PgSession, PgSessionFactory};
