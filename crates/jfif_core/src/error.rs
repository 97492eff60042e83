use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Marker must contain at least one byte")]
    EmptyMarker,

    #[error("Cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot determine size of {path}: {source}")]
    Stat {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot map {path}: {source}")]
    Map {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("'{0}': not a directory")]
    NotADirectory(PathBuf),

    #[error("Cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CoreError {
    /// True for failures acquiring the input buffer.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CoreError::Open { .. } | CoreError::Stat { .. } | CoreError::Map { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
