//! `dbprobe check` command - Diagnose a connection string.

use dbprobe::{DiagnosticReport, Pipeline, SilentReporter, logging};
use tracing::debug;

use crate::cli::{CheckArgs, OutputFormat};
use crate::config::{CheckSettings, Config};
use crate::error::CliResult;
use crate::exit_codes;
use crate::output;
use crate::reporter::ConsoleReporter;

/// Run the check command, returning the process exit code
pub async fn run(args: CheckArgs) -> CliResult<i32> {
    if args.debug {
        logging::init_with_level("debug");
    } else {
        logging::init();
    }

    let profile = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let settings = CheckSettings::resolve(&args, profile)?;
    debug!(
        timeout_ms = settings.probe.connect_timeout.as_millis() as u64,
        verbose = settings.probe.verbose,
        query_file = ?settings.request.query_file,
        "Resolved check settings"
    );

    let registry = dbprobe::default_registry();
    let pipeline = Pipeline::new(&registry, &settings.probe);

    let report = match args.format {
        OutputFormat::Text => {
            output::header("dbprobe connectivity check");
            let report = pipeline
                .run(&settings.request, &mut ConsoleReporter::new())
                .await;
            summary(&report);
            report
        }
        OutputFormat::Json => {
            let report = pipeline.run(&settings.request, &mut SilentReporter).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            report
        }
    };

    Ok(exit_codes::for_report(&report))
}

fn summary(report: &DiagnosticReport) {
    output::newline();
    match report.failed_stage() {
        Some(stage) => output::error(&format!(
            "Diagnosis stopped at stage {} ({})",
            stage.number(),
            stage
        )),
        None if report.has_warnings() => output::warn("All stages passed with warnings"),
        None => output::success("All stages passed"),
    }
}
