//! CLI entry point.
//!
//! Parses arguments with clap, runs the requested stages and maps failures to a non-zero exit
//! code. Logging is initialised first so every stage can emit diagnostics via `tracing`.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use smallworld::{
    cli::{run_cli, Cli},
    logging::{self, LoggingError},
};

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    run_cli(cli, &mut writer).context("failed to execute command")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        error!("command execution failed: {err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Tracing isn't available yet, this goes straight to stderr.
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialise logging: {err}");
}
