//! dbprobe - Command-line database connectivity diagnoser.

use clap::Parser;

use dbprobe_cli::cli::{Cli, Command};
use dbprobe_cli::commands;
use dbprobe_cli::error::CliResult;
use dbprobe_cli::exit_codes;
use dbprobe_cli::output;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            output::newline();
            output::error(&e.to_string());
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run() -> CliResult<i32> {
    // Usage errors exit with code 2 inside clap
    let cli = Cli::parse();

    match cli.command {
        Command::Check(args) => commands::check::run(args).await,
        Command::Dialects => commands::dialects::run()
            .await
            .map(|_| exit_codes::SUCCESS),
        Command::Version => commands::version::run().await.map(|_| exit_codes::SUCCESS),
    }
}
