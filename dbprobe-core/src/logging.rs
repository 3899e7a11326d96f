//! Logging setup for dbprobe.
//!
//! Logs are structured `tracing` events written to stderr, so they never mix
//! with the status lines a front end prints to stdout.
//!
//! # Environment Variables
//!
//! - `DBPROBE_DEBUG=true|1|yes` - Enable debug logging
//! - `DBPROBE_LOG_LEVEL=trace|debug|info|warn|error` - Set specific log level
//! - `DBPROBE_LOG_FORMAT=json|pretty|compact` - Set output format (default: json)
//!
//! # Usage
//!
//! ```rust,no_run
//! use dbprobe_core::logging;
//!
//! // Initialize from the environment (call once at startup)
//! logging::init();
//!
//! // Or force a level, e.g. for a `--debug` flag
//! logging::init_with_level("debug");
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

const DEBUG_VAR: &str = "DBPROBE_DEBUG";
const LEVEL_VAR: &str = "DBPROBE_LOG_LEVEL";
const FORMAT_VAR: &str = "DBPROBE_LOG_FORMAT";

/// Check if debug logging is enabled via `DBPROBE_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var(DEBUG_VAR)
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

/// Get the configured log level from `DBPROBE_LOG_LEVEL`.
///
/// Defaults to "debug" if `DBPROBE_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    resolve_level(env::var(LEVEL_VAR).ok().as_deref(), is_debug_enabled())
}

/// Get the configured log format from `DBPROBE_LOG_FORMAT`.
pub fn get_log_format() -> &'static str {
    resolve_format(env::var(FORMAT_VAR).ok().as_deref())
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn resolve_level(requested: Option<&str>, debug: bool) -> &'static str {
    let fallback = if debug { "debug" } else { "warn" };
    match requested.map(str::to_lowercase).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ => fallback,
    }
}

fn resolve_format(requested: Option<&str>) -> &'static str {
    match requested.map(str::to_lowercase).as_deref() {
        Some("pretty") => "pretty",
        Some("compact") => "compact",
        _ => "json",
    }
}

/// Initialize logging from the environment.
///
/// Does nothing unless `DBPROBE_DEBUG` or `DBPROBE_LOG_LEVEL` is set.
/// Subsequent calls are no-ops.
pub fn init() {
    if !is_debug_enabled() && env::var(LEVEL_VAR).is_err() {
        return;
    }
    install(get_log_level());
}

/// Initialize logging with a specific level, ignoring `DBPROBE_LOG_LEVEL`.
///
/// Unknown levels fall back to "warn".
pub fn init_with_level(level: &str) {
    install(resolve_level(Some(level), false));
}

fn install(level: &'static str) {
    INIT.call_once(|| {
        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let filter = EnvFilter::try_new(format!(
                "dbprobe={level},dbprobe_core={level},dbprobe_postgres={level},\
                 dbprobe_mysql={level},dbprobe_mssql={level},dbprobe_cli={level}"
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            let format = get_log_format();
            match format {
                "json" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().json().with_writer(std::io::stderr))
                        .init();
                }
                "compact" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().compact().with_writer(std::io::stderr))
                        .init();
                }
                _ => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().pretty().with_writer(std::io::stderr))
                        .init();
                }
            }

            tracing::info!(level, format, "dbprobe logging initialized");
        }

        #[cfg(not(feature = "tracing-subscriber"))]
        {
            let _ = level;
        }
    });
}
