//! Consumers of recovered blocks.
//!
//! The segmenter never touches storage itself; every block is handed to a
//! [`BlockSink`], which either persists it or merely reports it.

use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

/// Errors a sink may report for a single block.
///
/// Everything except [`SinkError::TooManyBlocks`] is local to one block and
/// the run carries on with the next one.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Cannot create {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path}: only {written} of {expected} bytes written")]
    ShortWrite {
        path: PathBuf,
        written: usize,
        expected: usize,
    },

    #[error("Cannot report block #{index}: {source}")]
    Report { index: u32, source: std::io::Error },

    #[error("Block #{index} exceeds the limit of {limit} blocks")]
    TooManyBlocks { index: u32, limit: u32 },
}

impl SinkError {
    /// True when no further block can be accepted by the sink.
    pub fn stops_dispatch(&self) -> bool {
        matches!(self, SinkError::TooManyBlocks { .. })
    }
}

/// Consumer of blocks produced by the segmenter.
///
/// Calls arrive one at a time in strictly increasing `index` order, so
/// implementations need not be reentrant.
pub trait BlockSink {
    fn dispatch(&mut self, bytes: &[u8], index: u32) -> Result<(), SinkError>;
}

/// Dry-run sink: reports each block on a writer and stores nothing.
pub struct ReportSink<W: Write> {
    out: W,
}

impl<W: Write> ReportSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl ReportSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> BlockSink for ReportSink<W> {
    fn dispatch(&mut self, bytes: &[u8], index: u32) -> Result<(), SinkError> {
        writeln!(
            self.out,
            "found JFIF data block #{}, with size {}",
            index,
            bytes.len()
        )
        .map_err(|source| SinkError::Report { index, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_sink_writes_one_line_per_block() {
        let mut sink = ReportSink::new(Vec::new());
        sink.dispatch(&[0u8; 10], 0).unwrap();
        sink.dispatch(&[0u8; 4], 1).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            text,
            "found JFIF data block #0, with size 10\n\
             found JFIF data block #1, with size 4\n"
        );
    }

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn report_sink_write_failure() {
        let mut sink = ReportSink::new(Closed);
        let err = sink.dispatch(&[0u8; 3], 4).unwrap_err();

        assert!(matches!(err, SinkError::Report { index: 4, .. }));
        assert!(!err.stops_dispatch());
    }

    #[test]
    fn only_block_limit_stops_dispatch() {
        let limit = SinkError::TooManyBlocks { index: 5, limit: 5 };
        let short = SinkError::ShortWrite {
            path: PathBuf::from("fnd00000.jpg"),
            written: 1,
            expected: 2,
        };
        assert!(limit.stops_dispatch());
        assert!(!short.stops_dispatch());
    }

    #[test]
    fn short_write_message() {
        let err = SinkError::ShortWrite {
            path: PathBuf::from("fnd00003.jpg"),
            written: 100,
            expected: 400,
        };
        assert_eq!(
            err.to_string(),
            "fnd00003.jpg: only 100 of 400 bytes written"
        );
    }
}
