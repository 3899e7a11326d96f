//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const EXAMPLES: &str = "\
Examples:
  Oracle:
    dbprobe check --url 'jdbc:oracle:thin:@//localhost:1521/service' --user '$DB_USER' --password '$DB_PASS'
    dbprobe check --url 'jdbc:oracle:thin:@localhost:1521:sid' --user '$DB_USER' --password '$DB_PASS'
  MySQL:
    dbprobe check --url 'jdbc:mysql://testmysql.local:3306/testdb' --user '$DB_USER' --password '$DB_PASS'
  PostgreSQL:
    dbprobe check --url 'jdbc:postgresql://localhost:5432/testdb' --user '$DB_USER' --password '$DB_PASS'
  SQL Server:
    dbprobe check --url 'jdbc:sqlserver://localhost:1433;databaseName=testdb' --user '$DB_USER' --password '$DB_PASS'";

/// dbprobe - Database connectivity diagnostics
#[derive(Parser, Debug)]
#[command(name = "dbprobe")]
#[command(author = "dbprobe contributors")]
#[command(version)]
#[command(
    about = "dbprobe - Database connectivity diagnostics",
    long_about = "Diagnoses a JDBC-style connection string one layer at a time: \
                  parse, network probe, driver, session, test query."
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Diagnose connectivity for a connection string
    Check(CheckArgs),

    /// List supported dialects and compiled-in drivers
    Dialects,

    /// Display version information
    Version,
}

// =============================================================================
// Check Command
// =============================================================================

/// Arguments for the `check` command
#[derive(Args, Debug, Default)]
#[command(after_help = EXAMPLES)]
pub struct CheckArgs {
    /// JDBC connection string (e.g. jdbc:postgresql://localhost:5432/app)
    #[arg(short, long, env = "DBPROBE_URL")]
    pub url: Option<String>,

    /// Username, or $NAME to read it from an environment variable
    #[arg(long, visible_alias = "usr", env = "DBPROBE_USER")]
    pub user: Option<String>,

    /// Password, or $NAME to read it from an environment variable
    #[arg(long, visible_alias = "pwd", env = "DBPROBE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// File whose contents are run instead of the timestamp query
    #[arg(long = "sql-file", visible_alias = "sqlf", value_name = "PATH")]
    pub sql_file: Option<PathBuf>,

    /// Network probe timeout in milliseconds [default: 5000]
    #[arg(short, long = "timeout-ms", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// TOML profile with [connection] and [probe] tables
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Debug output: detailed logs plus the resolved driver and session close
    #[arg(short, long)]
    pub debug: bool,
}

/// Report output format
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Status lines with markers
    #[default]
    Text,
    /// A single JSON report
    Json,
}
