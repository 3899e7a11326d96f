//! PostgreSQL connection configuration.

use dbprobe_core::{ConnectionTarget, strip_jdbc_label};
use percent_encoding::percent_decode_str;

use crate::error::{PgError, PgResult};

/// Default PostgreSQL port.
pub const DEFAULT_PORT: u16 = 5432;

/// Application name reported to the server when the URL sets none.
pub const DEFAULT_APPLICATION_NAME: &str = "dbprobe";

/// PostgreSQL connection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgConfig {
    /// Host (extracted from URL).
    pub host: String,
    /// Port (default: 5432).
    pub port: u16,
    /// Database name, if the URL has a path.
    pub database: Option<String>,
    /// Username.
    pub user: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// SSL mode.
    pub ssl_mode: SslMode,
    /// Application name (shown in pg_stat_activity).
    pub application_name: String,
    /// Properties not interpreted by dbprobe.
    pub options: Vec<(String, String)>,
}

/// SSL mode for connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    /// Disable SSL.
    Disable,
    /// Prefer SSL but allow non-SSL.
    #[default]
    Prefer,
    /// Require SSL.
    Require,
}

impl From<SslMode> for tokio_postgres::config::SslMode {
    fn from(mode: SslMode) -> Self {
        match mode {
            SslMode::Disable => tokio_postgres::config::SslMode::Disable,
            SslMode::Prefer => tokio_postgres::config::SslMode::Prefer,
            SslMode::Require => tokio_postgres::config::SslMode::Require,
        }
    }
}

impl PgConfig {
    /// Create a configuration from a JDBC-style PostgreSQL URL.
    ///
    /// Accepts `[jdbc:]postgresql://host[:port][/database][?props]`. The
    /// `user`, `password`, `ApplicationName`, `sslmode` and `ssl` properties
    /// are honored; anything else is kept in [`PgConfig::options`].
    pub fn from_url(url: &str) -> PgResult<Self> {
        let parsed = url::Url::parse(strip_jdbc_label(url))
            .map_err(|e| PgError::config(format!("invalid database URL: {}", e)))?;

        if parsed.scheme() != "postgresql" && parsed.scheme() != "postgres" {
            return Err(PgError::config(format!(
                "invalid scheme: expected 'postgresql' or 'postgres', got '{}'",
                parsed.scheme()
            )));
        }

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| PgError::config("missing host in URL"))?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();

        let port = parsed.port().unwrap_or(DEFAULT_PORT);

        let database = Some(parsed.path().trim_start_matches('/'))
            .filter(|db| !db.is_empty())
            .map(String::from);

        let mut user = Some(parsed.username())
            .filter(|u| !u.is_empty())
            .map(decode_userinfo);
        let mut password = parsed.password().map(decode_userinfo);

        let mut ssl_mode = SslMode::Prefer;
        let mut application_name = DEFAULT_APPLICATION_NAME.to_string();
        let mut options = Vec::new();

        for (key, value) in parsed.query_pairs() {
            match key.as_ref() {
                "user" => user = Some(value.into_owned()),
                "password" => password = Some(value.into_owned()),
                "ApplicationName" | "application_name" => {
                    application_name = value.into_owned();
                }
                "sslmode" => {
                    ssl_mode = match value.as_ref() {
                        "disable" | "allow" => SslMode::Disable,
                        "prefer" => SslMode::Prefer,
                        "require" | "verify-ca" | "verify-full" => SslMode::Require,
                        other => {
                            return Err(PgError::config(format!("invalid sslmode: {}", other)));
                        }
                    };
                }
                "ssl" => {
                    if value.eq_ignore_ascii_case("true") {
                        ssl_mode = SslMode::Require;
                    }
                }
                _ => options.push((key.into_owned(), value.into_owned())),
            }
        }

        Ok(Self {
            host,
            port,
            database,
            user,
            password,
            ssl_mode,
            application_name,
            options,
        })
    }

    /// Override the credentials with ones supplied outside the URL.
    pub fn with_credentials(mut self, user: Option<&str>, password: Option<&str>) -> Self {
        if let Some(user) = user {
            self.user = Some(user.to_string());
        }
        if let Some(password) = password {
            self.password = Some(password.to_string());
        }
        self
    }

    /// Point the configuration at the endpoint the reachability probe checked.
    pub fn with_target(mut self, target: &ConnectionTarget) -> Self {
        self.host = target.host.clone();
        self.port = target.port;
        self
    }

    /// Convert to tokio-postgres config.
    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config.host(&self.host);
        config.port(self.port);
        config.application_name(&self.application_name);
        config.ssl_mode(self.ssl_mode.into());

        if let Some(database) = &self.database {
            config.dbname(database);
        }
        if let Some(user) = &self.user {
            config.user(user);
        }
        if let Some(password) = &self.password {
            config.password(password);
        }

        config
    }
}

/// URL userinfo arrives percent-encoded (`p%40ss` for `p@ss`).
fn decode_userinfo(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
