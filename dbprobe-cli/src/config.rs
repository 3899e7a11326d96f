//! CLI configuration handling.
//!
//! A run is described by the command-line arguments, optionally layered on
//! top of a TOML profile:
//!
//! ```toml
//! [connection]
//! url = "jdbc:postgresql://db.internal:5432/app"
//! user = "$DB_USER"
//! password = "$DB_PASS"
//! sql_file = "checks/health.sql"
//!
//! [probe]
//! timeout_ms = 2000
//! ```
//!
//! Command-line values win over profile values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use dbprobe::{DEFAULT_PROBE_TIMEOUT, ProbeConfig, ProbeRequest};

use crate::cli::CheckArgs;
use crate::error::{CliError, CliResult};

/// Conventional profile file name
pub const CONFIG_FILE_NAME: &str = "dbprobe.toml";

/// dbprobe profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Connection settings
    pub connection: ConnectionConfig,

    /// Probe settings
    pub probe: ProbeSettings,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Connection configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// JDBC connection string
    pub url: Option<String>,

    /// Username (literal or `$NAME`)
    pub user: Option<String>,

    /// Password (literal or `$NAME`)
    pub password: Option<String>,

    /// Query file
    pub sql_file: Option<PathBuf>,
}

/// Probe configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Network probe timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_PROBE_TIMEOUT.as_millis() as u64,
        }
    }
}

/// Fully resolved inputs of a `check` run.
#[derive(Debug, Clone)]
pub struct CheckSettings {
    /// What to diagnose
    pub request: ProbeRequest,
    /// How to diagnose it
    pub probe: ProbeConfig,
}

impl CheckSettings {
    /// Merge command-line arguments over a profile and resolve `$NAME`
    /// references.
    pub fn resolve(args: &CheckArgs, profile: Config) -> CliResult<Self> {
        Self::resolve_with(args, profile, |name| std::env::var(name).ok())
    }

    /// Same as [`CheckSettings::resolve`], reading variables through `lookup`.
    pub fn resolve_with(
        args: &CheckArgs,
        profile: Config,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> CliResult<Self> {
        let connection = profile.connection;

        let url = args
            .url
            .clone()
            .or(connection.url)
            .filter(|u| !u.trim().is_empty())
            .ok_or(CliError::MissingUrl)?;

        let username = args
            .user
            .clone()
            .or(connection.user)
            .map(|v| resolve_reference(&v, &lookup))
            .transpose()?;
        let password = args
            .password
            .clone()
            .or(connection.password)
            .map(|v| resolve_reference(&v, &lookup))
            .transpose()?;

        let request = ProbeRequest {
            url,
            username,
            password,
            query_file: args.sql_file.clone().or(connection.sql_file),
        };

        let timeout_ms = args.timeout_ms.unwrap_or(profile.probe.timeout_ms);
        if timeout_ms == 0 {
            return Err(CliError::Config("timeout must be greater than 0 ms".into()));
        }

        let probe = ProbeConfig::default()
            .with_timeout(Duration::from_millis(timeout_ms))
            .with_verbose(args.debug);

        Ok(Self { request, probe })
    }
}

/// Resolve a `$NAME` environment reference; other values pass through.
pub fn resolve_reference(
    value: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> CliResult<String> {
    match value.strip_prefix('$') {
        Some(name) if !name.is_empty() => lookup(name).ok_or_else(|| CliError::EnvReference {
            name: name.to_string(),
        }),
        _ => Ok(value.to_string()),
    }
}
