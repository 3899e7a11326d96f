//! `dbprobe dialects` command - List supported dialects.

use dbprobe::Dialect;
use owo_colors::OwoColorize;

use crate::error::CliResult;
use crate::output::{self, kv};

/// Run the dialects command
pub async fn run() -> CliResult<()> {
    let registry = dbprobe::default_registry();

    output::header("Supported dialects");

    for dialect in Dialect::ALL {
        let status = if registry.is_available(dialect) {
            "compiled in".green().to_string()
        } else {
            "not available".yellow().to_string()
        };

        output::section(dialect.name());
        kv("Prefix", &format!("jdbc:{}", dialect.prefix()));
        kv("Default port", &dialect.default_port().to_string());
        kv("Driver", dialect.driver_id());
        kv("Test query", dialect.timestamp_query());
        kv("Session factory", &status);
        output::newline();
    }

    Ok(())
}
