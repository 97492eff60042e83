//! Recovery of JFIF images from raw byte buffers.
//!
//! A [`MarkerScanner`] locates start markers, a [`BlockSegmenter`] turns
//! consecutive markers into [`Block`]s, and a [`BlockSink`] decides what to do
//! with each one.

mod error;
pub mod scanner;
pub mod segment;
pub mod sink;

pub use error::{CoreError, Result};
pub use scanner::{JFIF_MARKER, MarkerScanner};
pub use segment::{Block, BlockSegmenter, DispatchReport, Segments};
pub use sink::{BlockSink, ReportSink, SinkError};
