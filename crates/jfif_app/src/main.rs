//! jfif-extract - pulls JFIF images out of raw card dumps and disk images.
//!
//! Every `FF D8 FF E1` marker starts a new image, which runs up to the next
//! marker or to the end of the input.

mod manifest;
mod options;
mod recovery;

use anyhow::{Context, Result};
use clap::Parser;
use humansize::{BINARY, format_size};
use jfif_core::CoreError;
use jfif_io::DEFAULT_MAX_BLOCKS;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::Level;

use options::{DEFAULT_OUTPUT_DIR, RecoveryOptions, parse_marker};
use recovery::RecoverySummary;

const EXIT_USAGE: u8 = 1;
const EXIT_NOT_A_DIRECTORY: u8 = 2;
const EXIT_OUTPUT_DIR: u8 = 4;
const EXIT_INPUT: u8 = 8;
const EXIT_BLOCK_LIMIT: u8 = 16;
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug, Clone)]
struct MarkerBytes(Vec<u8>);

impl FromStr for MarkerBytes {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_marker(s).map(MarkerBytes)
    }
}

#[derive(Parser, Debug)]
#[command(name = "jfif-extract")]
#[command(author, version, long_about = None)]
#[command(about = "Recover JFIF images from card dumps, disk images and block devices")]
struct Args {
    /// Input file or block device
    input: PathBuf,

    /// Directory to write fndNNNNN.jpg files into
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Only report the blocks found, write nothing. The output directory is
    /// neither created nor checked in this mode
    #[arg(short, long)]
    dry_run: bool,

    /// Increase log output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Refuse to write more than this many files
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_BLOCKS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    max_blocks: u32,

    /// Start marker as hex
    #[arg(long, default_value = "FFD8FFE1")]
    marker: MarkerBytes,

    /// Write a JSON manifest of recovered files
    #[arg(long)]
    manifest: Option<PathBuf>,
}

impl From<Args> for RecoveryOptions {
    fn from(args: Args) -> Self {
        RecoveryOptions::new(args.input)
            .with_output_dir(args.output)
            .dry_run(args.dry_run)
            .with_verbosity(args.verbose)
            .with_max_blocks(args.max_blocks)
            .with_marker(args.marker.0)
            .with_manifest(args.manifest)
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<CoreError>() {
        Some(CoreError::NotADirectory(_)) => EXIT_NOT_A_DIRECTORY,
        Some(CoreError::CreateDir { .. }) => EXIT_OUTPUT_DIR,
        Some(e) if e.is_input_error() => EXIT_INPUT,
        _ => EXIT_USAGE,
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let opts = RecoveryOptions::from(args);
    init_logging(opts.verbosity);

    match execute(&opts) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("jfif-extract: {:#}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn execute(opts: &RecoveryOptions) -> Result<u8> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    let summary = recovery::run(opts, &running)?;
    print_summary(opts, &summary);

    let report = &summary.report;
    Ok(if report.limit_reached.is_some() {
        EXIT_BLOCK_LIMIT
    } else if report.interrupted {
        EXIT_INTERRUPTED
    } else {
        0
    })
}

fn print_summary(opts: &RecoveryOptions, summary: &RecoverySummary) {
    let report = &summary.report;

    if let Some(index) = report.limit_reached {
        eprintln!(
            "jfif-extract: block #{} reached the limit of {} files; remaining blocks were not written",
            index, opts.max_blocks
        );
    }
    if report.interrupted {
        eprintln!("jfif-extract: interrupted, stopped after {} blocks", report.blocks);
    }

    // Dry-run output on stdout is the block report alone.
    if summary.dry_run {
        return;
    }

    if report.blocks == 0 {
        println!(
            "No JFIF data found in {} ({})",
            opts.input.display(),
            format_size(summary.input_size, BINARY)
        );
        return;
    }

    println!(
        "Recovered {} images ({}) from {} into {}",
        report.written,
        format_size(report.bytes, BINARY),
        opts.input.display(),
        opts.output_dir.display()
    );
    if report.failed > 0 {
        println!("Failed: {}", report.failed);
    }
}
