//! Dialect resolution.
//!
//! A connection string is classified by its vendor prefix, after an optional
//! leading `jdbc:` label. Prefixes are checked in a fixed priority order:
//! `oracle`, `mysql`, `postgresql`, `sqlserver`.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::{ProbeError, ProbeResult};
use crate::mask::mask_url;

/// Leading label carried by JDBC-style connection strings.
pub const JDBC_LABEL: &str = "jdbc:";

/// Database dialect of a connection string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Oracle Database (`jdbc:oracle:thin:...`)
    Oracle,
    /// MySQL / MariaDB (`jdbc:mysql://...`)
    MySql,
    /// PostgreSQL (`jdbc:postgresql://...`)
    PostgreSql,
    /// Microsoft SQL Server (`jdbc:sqlserver://...`)
    SqlServer,
}

impl Dialect {
    /// All dialects, in prefix-matching priority order.
    pub const ALL: [Dialect; 4] = [
        Dialect::Oracle,
        Dialect::MySql,
        Dialect::PostgreSql,
        Dialect::SqlServer,
    ];

    /// Resolve the dialect of a connection string.
    ///
    /// ```rust
    /// use dbprobe_core::Dialect;
    ///
    /// assert_eq!(Dialect::resolve("jdbc:mysql://localhost/test").unwrap(), Dialect::MySql);
    /// assert_eq!(Dialect::resolve("jdbc:oracle:thin:@host:1521:orcl").unwrap(), Dialect::Oracle);
    /// assert!(Dialect::resolve("invalid:url").is_err());
    /// ```
    pub fn resolve(url: &str) -> ProbeResult<Self> {
        let body = strip_jdbc_label(url);
        let dialect = Self::ALL
            .into_iter()
            .find(|d| body.starts_with(d.prefix()))
            .ok_or_else(|| ProbeError::UnsupportedDialect(mask_url(url)))?;
        debug!(dialect = %dialect, "Dialect resolved");
        Ok(dialect)
    }

    /// Vendor prefix matched after the `jdbc:` label.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Oracle => "oracle",
            Self::MySql => "mysql",
            Self::PostgreSql => "postgresql",
            Self::SqlServer => "sqlserver",
        }
    }

    /// Port used when the connection string carries none.
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Oracle => 1521,
            Self::MySql => 3306,
            Self::PostgreSql => 5432,
            Self::SqlServer => 1433,
        }
    }

    /// Well-known vendor driver identifier.
    pub fn driver_id(&self) -> &'static str {
        match self {
            Self::Oracle => "oracle.jdbc.OracleDriver",
            Self::MySql => "com.mysql.cj.jdbc.Driver",
            Self::PostgreSql => "org.postgresql.Driver",
            Self::SqlServer => "com.microsoft.sqlserver.jdbc.SQLServerDriver",
        }
    }

    /// Human-readable vendor name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Oracle => "Oracle",
            Self::MySql => "MySQL",
            Self::PostgreSql => "PostgreSQL",
            Self::SqlServer => "SQL Server",
        }
    }

    /// Query returning the server's current timestamp.
    pub fn timestamp_query(&self) -> &'static str {
        match self {
            Self::Oracle => "SELECT SYSDATE FROM DUAL",
            Self::SqlServer => "SELECT GETDATE()",
            Self::MySql | Self::PostgreSql => "SELECT CURRENT_TIMESTAMP",
        }
    }

    /// Whether this dialect uses the URI grammar (`vendor://host:port/...`).
    pub fn is_uri_style(&self) -> bool {
        !matches!(self, Self::Oracle)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Strip the leading `jdbc:` label, if present.
pub fn strip_jdbc_label(url: &str) -> &str {
    url.strip_prefix(JDBC_LABEL).unwrap_or(url)
}
