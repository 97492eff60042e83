use crate::error::{CoreError, Result};
use memchr::memchr;

/// Start marker written by PowerShot cameras. The JFIF standard says
/// `FF D8 FF E0`, but the recovered cards carry the EXIF APP1 variant.
pub const JFIF_MARKER: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE1];

/// Finds occurrences of a fixed start marker inside a byte buffer.
///
/// The scan locates candidates with a single-byte `memchr` search for the
/// marker's first byte, then verifies the remaining bytes in place. A failed
/// verification resumes the search one byte after the candidate, so a marker
/// that begins inside a near-miss is never skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerScanner {
    marker: Box<[u8]>,
}

impl MarkerScanner {
    pub fn new(marker: &[u8]) -> Result<Self> {
        if marker.is_empty() {
            return Err(CoreError::EmptyMarker);
        }
        Ok(Self {
            marker: marker.into(),
        })
    }

    #[must_use]
    pub fn jfif() -> Self {
        Self {
            marker: JFIF_MARKER.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn marker(&self) -> &[u8] {
        &self.marker
    }

    #[inline]
    #[must_use]
    pub fn marker_len(&self) -> usize {
        self.marker.len()
    }

    /// Returns the leftmost offset `p >= from` where the marker starts.
    ///
    /// `from` past the end of the buffer is not an error, it simply finds
    /// nothing.
    #[must_use]
    pub fn find(&self, buffer: &[u8], from: usize) -> Option<usize> {
        let (&first, rest) = self.marker.split_first()?;
        let last_start = buffer.len().checked_sub(self.marker.len())?;

        let mut pos = from;
        while pos <= last_start {
            let candidate = pos + memchr(first, &buffer[pos..=last_start])?;
            if buffer[candidate + 1..candidate + self.marker.len()] == *rest {
                return Some(candidate);
            }
            pos = candidate + 1;
        }
        None
    }
}

impl Default for MarkerScanner {
    fn default() -> Self {
        Self::jfif()
    }
}
