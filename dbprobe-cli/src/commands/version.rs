//! `dbprobe version` command - Display version information.

use crate::error::CliResult;
use crate::output::{self, kv};

/// Package version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the version command
pub async fn run() -> CliResult<()> {
    output::section("dbprobe");
    output::newline();

    kv("Version", VERSION);
    kv("Binary", "dbprobe");

    #[cfg(debug_assertions)]
    let build_mode = "debug";
    #[cfg(not(debug_assertions))]
    let build_mode = "release";

    kv("Build", build_mode);

    let mut drivers = dbprobe::enabled_drivers();
    if drivers.is_empty() {
        drivers.push("none");
    }
    kv("Drivers", &drivers.join(", "));

    output::newline();
    output::dim("Oracle connection strings are parsed and probed; no Oracle driver is bundled.");

    Ok(())
}
