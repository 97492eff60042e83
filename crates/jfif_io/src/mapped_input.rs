use jfif_core::{CoreError, Result};
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::Path;

/// The whole input file as one contiguous, read-only byte range.
///
/// The mapping length comes from seeking to the end of the input, so block
/// devices (whose stat size is 0) are mapped in full as well.
///
/// The mapping is only valid while nobody else modifies the underlying
/// file; no locking is performed.
pub struct MappedInput {
    mmap: Option<Mmap>,
}

impl MappedInput {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|source| CoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let stat_error = |source| CoreError::Stat {
            path: path.to_path_buf(),
            source,
        };
        // metadata().len() reports 0 for block devices; seeking does not.
        let size = file.seek(SeekFrom::End(0)).map_err(stat_error)?;
        file.seek(SeekFrom::Start(0)).map_err(stat_error)?;

        if size == 0 {
            return Ok(Self { mmap: None });
        }

        let map_error = |source| CoreError::Map {
            path: path.to_path_buf(),
            source,
        };
        let len = usize::try_from(size).map_err(|_| {
            map_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} bytes do not fit in the address space", size),
            ))
        })?;

        #[cfg(target_os = "linux")]
        {
            use rustix::fs::{Advice, fadvise};
            let _ = fadvise(&file, 0, None, Advice::Sequential);
        }

        let mmap = unsafe { MmapOptions::new().len(len).map(&file) }.map_err(map_error)?;

        #[cfg(unix)]
        {
            let _ = mmap.advise(memmap2::Advice::Sequential);
        }

        tracing::debug!(path = %path.display(), len, "input mapped");
        Ok(Self { mmap: Some(mmap) })
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        match &self.mmap {
            Some(mmap) => &mmap[..],
            None => &[],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
