use jfif_core::{CoreError, Result};
use std::fs;
use std::path::Path;

/// Makes sure `dir` exists and is a directory, creating it if needed.
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(CoreError::NotADirectory(dir.to_path_buf())),
        Err(_) => {
            tracing::info!(dir = %dir.display(), "creating output directory");
            fs::create_dir_all(dir).map_err(|source| CoreError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })
        }
    }
}
