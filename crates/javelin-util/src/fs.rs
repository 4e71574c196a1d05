//! Filesystem utilities.

use std::path::Path;

use crate::error::UtilError;

/// Create a directory and all parent directories if they do not exist.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> Result<(), UtilError> {
    std::fs::create_dir_all(path).map_err(|source| UtilError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Write `content` to `path` atomically (write-to-temp-then-rename).
///
/// Parent directories are created as needed, so a half-written action graph
/// is never observed by the execution engine.
///
/// # Errors
/// Returns an error if the parent directory, the temp file, or the rename fails.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), UtilError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    std::fs::write(tmp_path, content).map_err(|source| UtilError::Io {
        path: tmp_path.display().to_string(),
        source,
    })?;
    std::fs::rename(tmp_path, path).map_err(|source| UtilError::Io {
        path: path.display().to_string(),
        source,
    })
}
