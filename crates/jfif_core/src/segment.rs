//! Partitioning of a buffer into marker-delimited blocks.

use crate::scanner::MarkerScanner;
use crate::sink::{BlockSink, SinkError};
use std::iter::FusedIterator;
use std::ops::{ControlFlow, Range};

/// One candidate image: the bytes from a marker up to the next marker, or to
/// the end of the buffer for the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    pub offset: usize,
    pub length: usize,
    pub index: u32,
}

impl Block {
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    /// Borrows this block's bytes from the buffer it was produced from.
    #[inline]
    pub fn bytes<'b>(&self, buffer: &'b [u8]) -> &'b [u8] {
        &buffer[self.range()]
    }
}

/// Drives a [`MarkerScanner`] over a whole buffer.
#[derive(Debug, Clone, Default)]
pub struct BlockSegmenter {
    scanner: MarkerScanner,
}

impl BlockSegmenter {
    pub fn new(scanner: MarkerScanner) -> Self {
        Self { scanner }
    }

    pub fn scanner(&self) -> &MarkerScanner {
        &self.scanner
    }

    /// Lazily yields the blocks of `buffer` in offset order.
    ///
    /// Nothing is scanned until the first call to `next`, and each call scans
    /// only as far as the following marker. Calling `segment` again starts
    /// over from the beginning of the buffer.
    pub fn segment<'a>(&'a self, buffer: &'a [u8]) -> Segments<'a> {
        Segments {
            scanner: &self.scanner,
            buffer,
            state: State::Initial,
        }
    }

    /// Hands every block to `sink`. See [`BlockSegmenter::dispatch_with`].
    pub fn dispatch_all<S>(&self, buffer: &[u8], sink: &mut S) -> DispatchReport
    where
        S: BlockSink + ?Sized,
    {
        self.dispatch_with(buffer, sink, |_, _| ControlFlow::Continue(()))
    }

    /// Hands every block to `sink`, calling `observe` after each dispatch.
    ///
    /// Per-block sink failures are logged and counted, and dispatch moves on.
    /// A [`SinkError::TooManyBlocks`] refusal ends dispatch and is recorded in
    /// [`DispatchReport::limit_reached`]. `observe` returning
    /// `ControlFlow::Break` ends dispatch early; the report is marked as
    /// interrupted only if blocks were left undispatched.
    pub fn dispatch_with<S, F>(
        &self,
        buffer: &[u8],
        sink: &mut S,
        mut observe: F,
    ) -> DispatchReport
    where
        S: BlockSink + ?Sized,
        F: FnMut(&Block, Result<(), &SinkError>) -> ControlFlow<()>,
    {
        let mut report = DispatchReport::default();

        let mut segments = self.segment(buffer).peekable();
        while let Some(block) = segments.next() {
            report.blocks += 1;
            let outcome = sink.dispatch(block.bytes(buffer), block.index);

            match &outcome {
                Ok(()) => {
                    tracing::debug!(
                        index = block.index,
                        offset = block.offset,
                        length = block.length,
                        "block dispatched"
                    );
                    report.written += 1;
                    report.bytes += block.length as u64;
                }
                Err(e) if e.stops_dispatch() => {
                    tracing::warn!(index = block.index, "{}, stopping", e);
                    report.limit_reached = Some(block.index);
                }
                Err(e) => {
                    tracing::warn!(index = block.index, "{}", e);
                    report.failed += 1;
                }
            }

            let flow = observe(&block, outcome.as_ref().map(|_| ()));
            if report.limit_reached.is_some() {
                break;
            }
            if flow.is_break() && segments.peek().is_some() {
                report.interrupted = true;
                break;
            }
        }

        report
    }
}

/// Outcome of [`BlockSegmenter::dispatch_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Blocks handed to the sink, including refused and failed ones.
    pub blocks: u64,
    pub written: u64,
    pub failed: u64,
    /// Bytes covered by successfully dispatched blocks.
    pub bytes: u64,
    /// Index of the first block the sink refused because of its block limit.
    pub limit_reached: Option<u32>,
    pub interrupted: bool,
}

impl DispatchReport {
    pub fn is_complete(&self) -> bool {
        self.limit_reached.is_none() && !self.interrupted
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    Initial,
    Scanning { cur: usize, index: u32 },
    Done,
}

/// Iterator returned by [`BlockSegmenter::segment`].
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    scanner: &'a MarkerScanner,
    buffer: &'a [u8],
    state: State,
}

impl Iterator for Segments<'_> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        loop {
            match self.state {
                State::Initial => {
                    self.state = match self.scanner.find(self.buffer, 0) {
                        Some(cur) => State::Scanning { cur, index: 0 },
                        None => State::Done,
                    };
                }
                State::Scanning { cur, index } => {
                    let next = self
                        .scanner
                        .find(self.buffer, cur + self.scanner.marker_len());
                    let end = next.unwrap_or(self.buffer.len());

                    self.state = match (next, index.checked_add(1)) {
                        (Some(cur), Some(index)) => State::Scanning { cur, index },
                        (Some(cur), None) => {
                            tracing::warn!(
                                offset = cur,
                                remaining = self.buffer.len() - cur,
                                "block index space exhausted, rest of buffer not segmented"
                            );
                            State::Done
                        }
                        (None, _) => State::Done,
                    };

                    return Some(Block {
                        offset: cur,
                        length: end - cur,
                        index,
                    });
                }
                State::Done => return None,
            }
        }
    }
}

impl FusedIterator for Segments<'_> {}
