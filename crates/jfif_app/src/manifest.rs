//! JSON record of what was recovered and where it came from.

use anyhow::{Context, Result};
use chrono::Utc;
use jfif_core::Block;
use jfif_io::block_file_name;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct ManifestEntry {
    pub filename: String,
    pub index: u32,
    pub source_offset: String,
    pub source_offset_decimal: u64,
    pub file_size: u64,
    pub sha256_hash: String,
    pub recovery_timestamp: String,
}

impl ManifestEntry {
    pub fn new(block: &Block, bytes: &[u8]) -> Self {
        Self {
            filename: block_file_name(block.index),
            index: block.index,
            source_offset: format!("0x{:X}", block.offset),
            source_offset_decimal: block.offset as u64,
            file_size: bytes.len() as u64,
            sha256_hash: hex::encode(Sha256::digest(bytes)),
            recovery_timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Manifest {
    pub source: PathBuf,
    pub source_size: u64,
    pub marker: String,
    pub files: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(source: &Path, source_size: u64, marker: &[u8]) -> Self {
        Self {
            source: source.to_path_buf(),
            source_size,
            marker: hex::encode_upper(marker),
            files: Vec::new(),
        }
    }

    pub fn record(&mut self, block: &Block, bytes: &[u8]) {
        self.files.push(ManifestEntry::new(block, bytes));
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create manifest {}", path.display()))?;
        let mut out = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut out, self)
            .with_context(|| format!("Failed to write manifest {}", path.display()))?;
        out.flush()
            .with_context(|| format!("Failed to write manifest {}", path.display()))
    }
}
