//! # dbprobe-mysql
//!
//! MySQL session factory for dbprobe, built on `mysql_async`.
//!
//! ```rust
//! use dbprobe_core::{Dialect, DriverRegistry};
//! use dbprobe_mysql::MysqlSessionFactory;
//!
//! let registry = DriverRegistry::new().register(MysqlSessionFactory::new());
//! assert!(registry.is_available(Dialect::MySql));
//! ```

pub mod config;
pub mod error;
pub mod session;

pub use config::MysqlConfig;
pub use error::{MysqlError, MysqlResult};
pub use session::{MysqlSession, MysqlSessionFactory};
