//! Writes recovered blocks as individual `.jpg` files.

use jfif_core::{BlockSink, SinkError};
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File names carry at least five index digits; the default limit keeps
/// them at eight at most.
pub const DEFAULT_MAX_BLOCKS: u32 = 100_000_000;

const FILE_PREFIX: &str = "fnd";
const FILE_EXTENSION: &str = "jpg";

pub fn block_file_name(index: u32) -> String {
    format!("{}{:05}.{}", FILE_PREFIX, index, FILE_EXTENSION)
}

/// Sink writing each block to `<output_dir>/fndNNNNN.jpg`.
///
/// Create and write failures are reported per block. Blocks with an index at
/// or beyond `max_blocks` are refused with [`SinkError::TooManyBlocks`].
pub struct FileSink {
    output_dir: PathBuf,
    max_blocks: u32,
}

impl FileSink {
    /// `output_dir` must already exist, see
    /// [`prepare_output_dir`](crate::prepare_output_dir).
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            max_blocks: DEFAULT_MAX_BLOCKS,
        }
    }

    pub fn with_max_blocks(mut self, max_blocks: u32) -> Self {
        self.max_blocks = max_blocks;
        self
    }

    pub fn output_path(&self, index: u32) -> PathBuf {
        self.output_dir.join(block_file_name(index))
    }
}

/// Writes as much of `bytes` as the writer accepts, stopping at the first
/// zero-length write. Returns the number of bytes written.
fn write_fully(out: &mut impl Write, bytes: &[u8]) -> std::io::Result<usize> {
    let mut written = 0;
    while written < bytes.len() {
        match out.write(&bytes[written..]) {
            Ok(0) => break,
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(written)
}

fn write_block(out: &mut impl Write, bytes: &[u8], path: &Path) -> Result<(), SinkError> {
    let written = write_fully(out, bytes).map_err(|source| SinkError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    if written < bytes.len() {
        return Err(SinkError::ShortWrite {
            path: path.to_path_buf(),
            written,
            expected: bytes.len(),
        });
    }
    Ok(())
}

impl BlockSink for FileSink {
    fn dispatch(&mut self, bytes: &[u8], index: u32) -> Result<(), SinkError> {
        if index >= self.max_blocks {
            return Err(SinkError::TooManyBlocks {
                index,
                limit: self.max_blocks,
            });
        }

        let path = self.output_path(index);
        tracing::info!("writing {} bytes to {}", bytes.len(), path.display());

        let mut out = File::create(&path).map_err(|source| SinkError::Create {
            path: path.clone(),
            source,
        })?;

        write_block(&mut out, bytes, &path)?;
        out.sync_all().map_err(|source| SinkError::Write { path, source })
    }
}
