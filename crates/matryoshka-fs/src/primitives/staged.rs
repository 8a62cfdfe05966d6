use crate::{Error, Result};
use std::path::Path;
use tempfile::TempPath;

#[derive(Clone, Copy, Debug)]
pub struct StageOptions {
    prefix: &'static str,
    suffix: &'static str,
}

impl Default for StageOptions {
    fn default() -> Self { Self::new() }
}

impl StageOptions {
    pub fn new() -> Self {
        Self {
            prefix: ".",
            suffix: ".tmp~",
        }
    }

    pub fn prefix(mut self, prefix: &'static str) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn suffix(mut self, suffix: &'static str) -> Self {
        self.suffix = suffix;
        self
    }

    pub fn prefix_str(&self) -> &'static str { self.prefix }

    pub fn suffix_str(&self) -> &'static str { self.suffix }
}

/// A uniquely named file inside a target directory, waiting to be renamed
/// into place.
///
/// The staging file lives on the same filesystem as its destination so
/// [`StagedFile::commit`] is a single atomic rename. An uncommitted file is
/// removed on drop.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
}

impl StagedFile {
    pub fn new_in(dir: impl AsRef<Path>, options: StageOptions) -> Result<Self> {
        let dir = dir.as_ref();
        let file = tempfile::Builder::new()
            .prefix(options.prefix_str())
            .suffix(options.suffix_str())
            .tempfile_in(dir)
            .map_err(|e| Error::Stage {
                dir: dir.to_path_buf(),
                source: e,
            })?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Rename onto `dest`, replacing whatever is there.
    ///
    /// Callers that key `dest` by content may race other writers of the same
    /// bytes; whichever rename lands last wins with identical content.
    pub fn commit(self, dest: impl AsRef<Path>) -> Result<()> {
        let dest = dest.as_ref();
        let staged = self.path.to_path_buf();
        self.path.persist(dest).map_err(|e| Error::Commit {
            staged,
            dest: dest.to_path_buf(),
            source: e.error,
        })
    }
}
