use crate::{Error, Result};
use std::path::Path;

/// Create `path` and its parents unless it is already a directory.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(Error::NotADirectory {
            path: path.to_path_buf(),
        }),
        Err(_) => std::fs::create_dir_all(path).map_err(|e| Error::CreateDir {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
