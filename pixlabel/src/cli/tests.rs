//! Unit tests for argument parsing and command execution.

use super::{Background, Cli, CliError, Connectivity, render_summary, run_cli};

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use clap::Parser;
use pixlabel_core::PixelFormat;
use pixlabel_region::{MAX_TAGS, RegionError};
use pixlabel_test::test_data_path;
use rstest::rstest;
use tempfile::TempDir;
use tracing::Level;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn temp_dir() -> TempDir {
    TempDir::new().expect("create temporary directory")
}

fn create_file(dir: &TempDir, name: &str, contents: &str) -> std::io::Result<PathBuf> {
    let path = dir.path().join(name);
    std::fs::write(&path, contents)?;
    Ok(path)
}

fn cli_for(input: &Path, output: &Path, threads: usize) -> Cli {
    Cli {
        input: input.to_path_buf(),
        threads,
        output: output.to_path_buf(),
        connectivity: Connectivity::Four,
        background: Background::Zero,
        max_tags: MAX_TAGS,
    }
}

/// Collects formatted log lines in memory.
#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn text(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn run_cli_expecting_error(cli: Cli, reason: &str) -> CliError {
    match run_cli(cli) {
        Ok(_) => panic!("{reason}"),
        Err(err) => err,
    }
}

#[test]
fn parse_defaults() {
    let cli = Cli::try_parse_from(["pixlabel", "in.pbm"]).expect("arguments must parse");
    assert_eq!(cli.input, PathBuf::from("in.pbm"));
    assert_eq!(cli.threads, 1);
    assert_eq!(cli.output, PathBuf::from("classes.pgm"));
    assert_eq!(cli.connectivity, Connectivity::Four);
    assert_eq!(cli.background, Background::TopLeft);
    assert_eq!(cli.max_tags, 65535);
}

#[test]
fn parse_all_options() {
    let cli = Cli::try_parse_from([
        "pixlabel",
        "in.pbm",
        "4",
        "-o",
        "out.pgm",
        "--connectivity",
        "8",
        "--background",
        "zero",
        "--max-tags",
        "100",
    ])
    .expect("arguments must parse");
    assert_eq!(cli.threads, 4);
    assert_eq!(cli.output, PathBuf::from("out.pgm"));
    assert_eq!(cli.connectivity, Connectivity::Eight);
    assert_eq!(cli.background, Background::Zero);
    assert_eq!(cli.max_tags, 100);
}

#[rstest]
#[case::bad_connectivity(&["pixlabel", "in.pbm", "--connectivity", "6"])]
#[case::bad_threads(&["pixlabel", "in.pbm", "many"])]
#[case::missing_input(&["pixlabel"])]
fn parse_rejects(#[case] args: &[&str]) {
    assert!(Cli::try_parse_from(args).is_err());
}

#[rstest]
#[case::four_single(Connectivity::Four, 1, 11)]
#[case::four_parallel(Connectivity::Four, 4, 11)]
#[case::eight_single(Connectivity::Eight, 1, 7)]
#[case::eight_parallel(Connectivity::Eight, 3, 7)]
fn run_labels_fixture(
    #[case] connectivity: Connectivity,
    #[case] threads: usize,
    #[case] expected: u32,
) -> TestResult {
    let dir = temp_dir();
    let output = dir.path().join("classes.pgm");
    let mut cli = cli_for(Path::new(&test_data_path("blobs.pbm")), &output, threads);
    cli.connectivity = connectivity;

    let summary = run_cli(cli)?;
    assert_eq!(summary.report.num_components(), expected);
    assert_eq!(summary.report.total_pixels(), 32);

    let labeled = pixlabel_io::read_image(&output)?;
    assert_eq!(labeled.format(), PixelFormat::Gray16);
    assert_eq!((labeled.width(), labeled.height()), (16, 10));
    assert_eq!(labeled.count_nonzero(), 32);
    Ok(())
}

#[test]
fn top_left_background_inverts_the_image() -> TestResult {
    let dir = temp_dir();
    // (0, 0) is set, so the two clear pixels are the foreground
    let input = create_file(&dir, "inverted.pbm", "P1\n3 2\n1 0 1\n1 1 0\n")?;
    let output = dir.path().join("classes.pgm");
    let mut cli = cli_for(&input, &output, 1);
    cli.background = Background::TopLeft;

    let summary = run_cli(cli)?;
    assert_eq!(summary.report.num_components(), 2);
    let labeled = pixlabel_io::read_image(&output)?;
    assert_eq!(labeled.get_pixel(1, 0), Some(1));
    assert_eq!(labeled.get_pixel(2, 1), Some(2));
    assert_eq!(labeled.get_pixel(0, 0), Some(0));
    Ok(())
}

#[test]
fn run_rejects_missing_input() {
    let dir = temp_dir();
    let cli = cli_for(&dir.path().join("absent.pbm"), &dir.path().join("out.pgm"), 1);
    let err = run_cli_expecting_error(cli, "missing input must fail");
    assert!(matches!(err, CliError::Read { .. }));
}

#[test]
fn run_rejects_gray_input() -> TestResult {
    let dir = temp_dir();
    let input = create_file(&dir, "gray.pgm", "P2\n2 1\n255\n0 200\n")?;
    let cli = cli_for(&input, &dir.path().join("out.pgm"), 1);
    let err = run_cli_expecting_error(cli, "gray input must fail");
    assert!(matches!(err, CliError::NotBitmap { format: "8bit grayscale", .. }));
    Ok(())
}

#[test]
fn run_rejects_zero_threads() -> TestResult {
    let dir = temp_dir();
    let input = create_file(&dir, "dot.pbm", "P1\n1 1\n1\n")?;
    let output = dir.path().join("out.pgm");
    let cli = cli_for(&input, &output, 0);
    let err = run_cli_expecting_error(cli, "zero threads must fail");
    assert!(matches!(err, CliError::Region(RegionError::InvalidParameters(_))));
    assert!(!output.exists());
    Ok(())
}

#[test]
fn run_reports_capacity_overflow() -> TestResult {
    let dir = temp_dir();
    let input = create_file(&dir, "dots.pbm", "P1\n5 1\n1 0 1 0 1\n")?;
    let mut cli = cli_for(&input, &dir.path().join("out.pgm"), 1);
    cli.max_tags = 2;
    let err = run_cli_expecting_error(cli, "three dots need three tags");
    assert!(matches!(
        err,
        CliError::Region(RegionError::CapacityExceeded { capacity: 2 })
    ));
    Ok(())
}

#[test]
fn render_summary_reports_largest_component() -> TestResult {
    let dir = temp_dir();
    let output = dir.path().join("classes.pgm");
    let mut cli = cli_for(Path::new(&test_data_path("blobs.pbm")), &output, 1);
    cli.connectivity = Connectivity::Eight;
    let summary = run_cli(cli)?;

    let mut buffer = Vec::new();
    render_summary(&summary, &mut buffer)?;
    let text = String::from_utf8(buffer)?;
    assert!(text.contains("Found 7 connected components."));
    // the ring is the fifth component in scan order
    assert!(text.contains(&format!(
        "Largest connected component is class #000005, has {:9} pixels.",
        10
    )));
    assert!(text.contains("Total time: "));
    Ok(())
}

#[test]
fn run_describes_input_at_debug_level() -> TestResult {
    let dir = temp_dir();
    let output = dir.path().join("classes.pgm");
    let cli = cli_for(Path::new(&test_data_path("blobs.pbm")), &output, 2);

    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, || run_cli(cli))?;

    let text = log.text();
    assert!(text.contains("Raster info for input:"));
    assert!(text.contains("width 16 x height 10, bitmap format"));
    assert!(text.contains("labeling completed"));
    Ok(())
}
