//! # dbprobe
//!
//! Staged connectivity diagnostics for JDBC-style database connection strings.
//!
//! dbprobe answers "why can't I connect?" one layer at a time:
//! - Parse the connection string and extract host and port
//! - Probe the TCP endpoint with a bounded timeout
//! - Select the compiled-in session factory for the dialect
//! - Open a session with the supplied credentials
//! - Run a timestamp query (or a query from a file) and show the result
//!
//! Oracle, MySQL, PostgreSQL and SQL Server connection strings are
//! understood. Session factories for PostgreSQL, MySQL and SQL Server are
//! enabled by the `postgres`, `mysql` and `mssql` features.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dbprobe::prelude::*;
//! use dbprobe::SilentReporter;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let registry = dbprobe::default_registry();
//!     let config = ProbeConfig::default();
//!     let request = ProbeRequest::new("jdbc:postgresql://localhost:5432/app")
//!         .username("app")
//!         .password("secret");
//!
//!     let report = Pipeline::new(&registry, &config)
//!         .run(&request, &mut SilentReporter)
//!         .await;
//!
//!     match report.failed_outcome() {
//!         Some(failure) => eprintln!("{}: {}", failure.stage, failure.detail),
//!         None => println!("all stages passed"),
//!     }
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use dbprobe_core::{
    ConnectRequest, ConnectionString, ConnectionTarget, DEFAULT_PROBE_TIMEOUT, DbOperation,
    DiagnosticOutcome, DiagnosticReport, Dialect, DriverRegistry, FailureClass, Pipeline,
    PipelineStage, ProbeConfig, ProbeError, ProbeRequest, ProbeResult, RecordingReporter,
    ReportEvent, Reporter, Session, SessionFactory, SilentReporter, SqlErrorDetail, Status,
    logging, parse, probe, render_chain,
};

/// PostgreSQL session factory.
#[cfg(feature = "postgres")]
#[cfg_attr(docsrs, doc(cfg(feature = "postgres")))]
pub mod postgres {
    pub use dbprobe_postgres::*;
}

/// MySQL session factory.
#[cfg(feature = "mysql")]
#[cfg_attr(docsrs, doc(cfg(feature = "mysql")))]
pub mod mysql {
    pub use dbprobe_mysql::*;
}

/// SQL Server session factory.
#[cfg(feature = "mssql")]
#[cfg_attr(docsrs, doc(cfg(feature = "mssql")))]
pub mod mssql {
    pub use dbprobe_mssql::*;
}

/// Registry with every session factory compiled into this build.
///
/// Oracle never has a factory, so Oracle runs stop at `LoadDriver`.
pub fn default_registry() -> DriverRegistry {
    #[allow(unused_mut)]
    let mut registry = DriverRegistry::new();

    #[cfg(feature = "postgres")]
    {
        registry = registry.register(dbprobe_postgres::PgSessionFactory::new());
    }

    #[cfg(feature = "mysql")]
    {
        registry = registry.register(dbprobe_mysql::MysqlSessionFactory::new());
    }

    #[cfg(feature = "mssql")]
    {
        registry = registry.register(dbprobe_mssql::MssqlSessionFactory::new());
    }

    registry
}

/// Names of the driver features enabled in this build.
pub fn enabled_drivers() -> Vec<&'static str> {
    #[allow(unused_mut)]
    let mut features = Vec::new();

    #[cfg(feature = "postgres")]
    features.push("postgres");

    #[cfg(feature = "mysql")]
    features.push("mysql");

    #[cfg(feature = "mssql")]
    features.push("mssql");

    features
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use dbprobe_core::prelude::*;

    pub use crate::default_registry;
}
