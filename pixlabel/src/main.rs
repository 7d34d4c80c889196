//! `pixlabel` binary entry point.
//!
//! Parses the arguments, labels the input, prints the summary and maps any
//! failure to a non-zero exit code.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use pixlabel::cli::{Cli, render_summary, run_cli};
use pixlabel::logging;
use tracing::error;

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let summary = run_cli(cli).context("failed to label image")?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_summary(&summary, &mut writer).context("failed to render summary")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        error!(error = %format_args!("{err:#}"), "command execution failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
