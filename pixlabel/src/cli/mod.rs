//! Command-line interface for the `pixlabel` binary.
//!
//! `pixlabel <input> [threads]` labels a NetPBM bitmap, writes the labeled
//! raster as a 16-bit binary PGM and prints a short summary.

mod commands;

pub use commands::{
    Background, Cli, CliError, Connectivity, ExecutionSummary, render_summary, run_cli,
};

#[cfg(test)]
mod tests;
