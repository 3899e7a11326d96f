//! CLI error types and result alias.

use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
///
/// Diagnostic failures are not errors here: they end up in the report and
/// its exit code. These cover everything that prevents a run from starting.
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(dbprobe::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(code(dbprobe::config))]
    Config(String),

    /// No connection string on the command line, in the environment or profile
    #[error("Missing connection string")]
    #[diagnostic(
        code(dbprobe::usage),
        help("pass --url, set DBPROBE_URL, or add url to the [connection] table of a profile")
    )]
    MissingUrl,

    /// A `$NAME` reference named an unset variable
    #[error("Environment variable {name} is not set")]
    #[diagnostic(code(dbprobe::env))]
    EnvReference {
        /// Variable name without the `$`
        name: String,
    },

    /// Report serialization error
    #[error("Output error: {0}")]
    #[diagnostic(code(dbprobe::output))]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingUrl => exit_codes::USAGE_ERROR,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::Config(format!("Failed to parse TOML: {}", err))
    }
}
