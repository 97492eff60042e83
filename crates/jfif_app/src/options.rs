use jfif_core::JFIF_MARKER;
use jfif_io::DEFAULT_MAX_BLOCKS;
use std::path::PathBuf;

pub const DEFAULT_OUTPUT_DIR: &str = "/tmp/jfif.recovered";

/// Everything a recovery run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct RecoveryOptions {
    /// Card dump, disk image or block device to scan
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Report blocks instead of writing them
    pub dry_run: bool,
    pub verbosity: u8,
    /// Blocks beyond this count are refused and the run reports it
    pub max_blocks: u32,
    pub marker: Vec<u8>,
    /// Where to write the JSON recovery manifest, if anywhere
    pub manifest: Option<PathBuf>,
}

impl Default for RecoveryOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            dry_run: false,
            verbosity: 0,
            max_blocks: DEFAULT_MAX_BLOCKS,
            marker: JFIF_MARKER.to_vec(),
            manifest: None,
        }
    }
}

impl RecoveryOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_max_blocks(mut self, max_blocks: u32) -> Self {
        self.max_blocks = max_blocks;
        self
    }

    pub fn with_marker(mut self, marker: Vec<u8>) -> Self {
        self.marker = marker;
        self
    }

    pub fn with_manifest(mut self, manifest: Option<PathBuf>) -> Self {
        self.manifest = manifest;
        self
    }
}

/// Parses a marker given as hex, e.g. `FFD8FFE1` or `ff:d8:ff:e0`.
pub fn parse_marker(s: &str) -> Result<Vec<u8>, String> {
    let digits: String = s
        .chars()
        .filter(|c| !matches!(c, ':' | ' ' | '-'))
        .collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(&digits);

    let bytes = hex::decode(digits).map_err(|e| format!("invalid marker '{}': {}", s, e))?;
    if bytes.is_empty() {
        return Err("marker must contain at least one byte".to_string());
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_behaviour() {
        let opts = RecoveryOptions::new("card.img");
        assert_eq!(opts.output_dir, PathBuf::from("/tmp/jfif.recovered"));
        assert_eq!(opts.marker, vec![0xFF, 0xD8, 0xFF, 0xE1]);
        assert_eq!(opts.max_blocks, 100_000_000);
        assert!(!opts.dry_run);
        assert!(opts.manifest.is_none());
    }

    #[test]
    fn parse_marker_formats() {
        assert_eq!(parse_marker("FFD8FFE1").unwrap(), vec![0xFF, 0xD8, 0xFF, 0xE1]);
        assert_eq!(parse_marker("ff:d8:ff:e0").unwrap(), vec![0xFF, 0xD8, 0xFF, 0xE0]);
        assert_eq!(parse_marker("0xFFD8").unwrap(), vec![0xFF, 0xD8]);
    }

    #[test]
    fn parse_marker_rejects_bad_input() {
        assert!(parse_marker("").is_err());
        assert!(parse_marker("FFD").is_err());
        assert!(parse_marker("zz").is_err());
    }
}
