use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputDirectoryError {
    #[error("cannot create output directory {path:?}: {source}")]
    Create { path: PathBuf, source: io::Error },
    #[error("output path {path:?} is not a directory")]
    NotADirectory { path: PathBuf },
    #[error("output directory {path:?} is not writable: {source}")]
    NotWritable { path: PathBuf, source: io::Error },
}

/// Ensure the output directory exists and accepts new files; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), OutputDirectoryError> {
    if dir.exists() {
        if !dir.is_dir() {
            return Err(OutputDirectoryError::NotADirectory {
                path: dir.to_path_buf(),
            });
        }
    } else {
        fs::create_dir_all(dir).map_err(|source| OutputDirectoryError::Create {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    // Writability check; the temp file is removed on drop.
    NamedTempFile::new_in(dir).map_err(|source| OutputDirectoryError::NotWritable {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(())
}
