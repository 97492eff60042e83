use crate::manifest::Manifest;
use crate::options::RecoveryOptions;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use jfif_core::{
    Block, BlockSegmenter, BlockSink, DispatchReport, MarkerScanner, ReportSink, SinkError,
};
use jfif_io::{FileSink, MappedInput, prepare_output_dir};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone)]
pub struct RecoverySummary {
    pub input_size: u64,
    pub dry_run: bool,
    pub report: DispatchReport,
}

fn progress_bar(len: u64, hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")?
            .progress_chars("=>-"),
    );
    Ok(pb)
}

/// Scans the input and dispatches every block, either to files in the
/// output directory or, in dry-run mode, to a report on stdout.
///
/// `running` is polled between blocks; clearing it stops the run after the
/// block in flight.
pub fn run(opts: &RecoveryOptions, running: &AtomicBool) -> Result<RecoverySummary> {
    let scanner = MarkerScanner::new(&opts.marker)?;

    if !opts.dry_run {
        prepare_output_dir(&opts.output_dir)?;
    }

    let input = MappedInput::open(&opts.input)?;
    let buffer = input.as_slice();
    tracing::info!(
        input = %opts.input.display(),
        size = input.len(),
        "scanning input"
    );

    let mut sink: Box<dyn BlockSink> = if opts.dry_run {
        Box::new(ReportSink::stdout())
    } else {
        Box::new(FileSink::new(&opts.output_dir).with_max_blocks(opts.max_blocks))
    };

    let mut manifest = match &opts.manifest {
        Some(_) if !opts.dry_run => Some(Manifest::new(
            &opts.input,
            buffer.len() as u64,
            scanner.marker(),
        )),
        _ => None,
    };

    let pb = progress_bar(buffer.len() as u64, opts.dry_run)?;
    let segmenter = BlockSegmenter::new(scanner);

    let report = segmenter.dispatch_with(
        buffer,
        &mut *sink,
        |block: &Block, outcome: Result<(), &SinkError>| {
            pb.set_position(block.end() as u64);
            pb.set_message(format!("Found {} blocks", block.index as u64 + 1));

            if outcome.is_ok() {
                if let Some(manifest) = manifest.as_mut() {
                    manifest.record(block, block.bytes(buffer));
                }
            }

            if running.load(Ordering::SeqCst) {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        },
    );
    pb.finish_and_clear();

    if let (Some(manifest), Some(path)) = (manifest, &opts.manifest) {
        manifest
            .write_to(path)
            .context("Recovered files were written but the manifest was not")?;
        tracing::info!(path = %path.display(), "manifest written");
    }

    tracing::info!(
        blocks = report.blocks,
        written = report.written,
        failed = report.failed,
        "scan complete"
    );

    Ok(RecoverySummary {
        input_size: input.len() as u64,
        dry_run: opts.dry_run,
        report,
    })
}
