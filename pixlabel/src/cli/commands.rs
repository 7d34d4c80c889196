//! Argument parsing and execution of the labeling command.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use pixlabel_core::PixelFormat;
use pixlabel_io::{Encoding, IoError};
use pixlabel_region::{
    BackgroundRule, ConnectivityType, LabelOptions, LabelReport, MAX_TAGS, RegionError,
    label_connected_components,
};
use thiserror::Error;
use tracing::{Level, Span, debug, enabled, field, info, instrument};

const DEFAULT_OUTPUT: &str = "classes.pgm";

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "pixlabel",
    about = "Label the connected components of a NetPBM bitmap."
)]
pub struct Cli {
    /// Bitmap to label (P1 or P4).
    pub input: PathBuf,

    /// Number of worker threads.
    #[arg(default_value_t = 1, value_parser = clap::value_parser!(usize))]
    pub threads: usize,

    /// Where to write the labeled raster.
    #[arg(long, short = 'o', default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Pixel adjacency.
    #[arg(long, value_enum, default_value_t = Connectivity::Four)]
    pub connectivity: Connectivity,

    /// How the background color is chosen.
    #[arg(long, value_enum, default_value_t = Background::TopLeft)]
    pub background: Background,

    /// Capacity of the provisional tag table.
    #[arg(long, default_value_t = MAX_TAGS)]
    pub max_tags: u32,
}

/// Pixel adjacency accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Connectivity {
    /// Edge neighbors only.
    #[value(name = "4")]
    Four,
    /// Edge and corner neighbors.
    #[value(name = "8")]
    Eight,
}

impl From<Connectivity> for ConnectivityType {
    fn from(value: Connectivity) -> Self {
        match value {
            Connectivity::Four => ConnectivityType::FourWay,
            Connectivity::Eight => ConnectivityType::EightWay,
        }
    }
}

/// Background selection accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Background {
    /// Clear bits are background.
    Zero,
    /// The color of the top-left pixel is background.
    TopLeft,
}

impl From<Background> for BackgroundRule {
    fn from(value: Background) -> Self {
        match value {
            Background::Zero => BackgroundRule::Zero,
            Background::TopLeft => BackgroundRule::TopLeft,
        }
    }
}

/// Errors surfaced while executing the command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The input could not be read or decoded.
    #[error("failed to read `{path}`: {source}")]
    Read {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying codec error.
        #[source]
        source: IoError,
    },
    /// The input decoded to something other than a bitmap.
    #[error("`{path}` holds {format} data; a bitmap (P1 or P4) is required")]
    NotBitmap {
        /// Offending input.
        path: PathBuf,
        /// Format the input decoded to.
        format: &'static str,
    },
    /// Labeling failed.
    #[error(transparent)]
    Region(#[from] RegionError),
    /// The labeled raster could not be written.
    #[error("failed to write `{path}`: {source}")]
    Write {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying codec error.
        #[source]
        source: IoError,
    },
}

/// Summarises the outcome of a labeling run.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Labeled input.
    pub input: PathBuf,
    /// Where the labeled raster was written.
    pub output: PathBuf,
    /// Worker threads used.
    pub threads: usize,
    /// Components, tag count and stage timings.
    pub report: LabelReport,
}

/// Executes the command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when reading, labeling or writing fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use std::ffi::OsString;
/// # use clap::Parser;
/// # use pixlabel::cli::{Cli, run_cli};
/// # use tempfile::TempDir;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let dir = TempDir::new()?;
/// let input = dir.path().join("dots.pbm");
/// std::fs::write(&input, "P1\n3 1\n0 1 0\n")?;
/// let output = dir.path().join("classes.pgm");
/// let cli = Cli::try_parse_from([
///     OsString::from("pixlabel"),
///     input.clone().into(),
///     "2".into(),
///     "--output".into(),
///     output.clone().into(),
/// ])?;
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.report.num_components(), 1);
/// assert!(output.exists());
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(input = field::Empty, threads = cli.threads),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    let Cli {
        input,
        threads,
        output,
        connectivity,
        background,
        max_tags,
    } = cli;
    Span::current().record("input", field::display(input.display()));

    let source = pixlabel_io::read_image(&input).map_err(|source| CliError::Read {
        path: input.clone(),
        source,
    })?;
    if source.format() != PixelFormat::Bitmap {
        return Err(CliError::NotBitmap {
            path: input,
            format: source.format().name(),
        });
    }

    if enabled!(Level::DEBUG) {
        let mut dump = Vec::new();
        if source.print_info(&mut dump, Some("input")).is_ok() {
            debug!("{}", String::from_utf8_lossy(&dump).trim_end());
        }
    }

    let options = LabelOptions::new(connectivity.into())
        .with_workers(threads)
        .with_background(background.into())
        .with_max_tags(max_tags);
    let (labeled, report) = label_connected_components(&source, &options)?;

    pixlabel_io::write_image(&labeled, &output, Encoding::Binary).map_err(|source| {
        CliError::Write {
            path: output.clone(),
            source,
        }
    })?;

    info!(
        components = report.num_components(),
        tags = report.num_tags,
        output = %output.display(),
        "labeling completed"
    );
    Ok(ExecutionSummary {
        input,
        output,
        threads,
        report,
    })
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let report = &summary.report;
    writeln!(
        writer,
        "Found {} connected components.",
        report.num_components()
    )?;
    if let Some(largest) = report.largest() {
        writeln!(
            writer,
            "Largest connected component is class #{:06}, has {:9} pixels.",
            largest.id, largest.pixel_count
        )?;
    }
    let timings = &report.timings;
    writeln!(
        writer,
        "Total time: {:.6}s; tag {:.6}, stitch {:.6}, reduce {:.6}, retag {:.6}, analyze {:.6}",
        timings.total().as_secs_f64(),
        timings.tag.as_secs_f64(),
        timings.stitch.as_secs_f64(),
        timings.reduce.as_secs_f64(),
        timings.retag.as_secs_f64(),
        timings.analyze.as_secs_f64(),
    )?;
    Ok(())
}
