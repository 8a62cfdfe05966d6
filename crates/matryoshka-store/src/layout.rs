//! Directory layout of the content store.
//!
//! ```text
//! <root>/
//!   .<random>.tmp~     staging files, same filesystem as the partitions
//!   text/<sha256-hex>  compressed content classified as text
//!   bin/<sha256-hex>   compressed content classified as binary
//! ```

use std::path::{Path, PathBuf};

use matryoshka_fs::ensure_dir;

use crate::Result;

pub const TEXT_DIR: &str = "text";
pub const BIN_DIR: &str = "bin";

#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
    text: PathBuf,
    bin:  PathBuf,
}

impl StoreLayout {
    pub fn builder() -> StoreLayoutBuilder { StoreLayoutBuilder::new() }

    pub fn root(&self) -> &Path { &self.root }

    pub fn text_dir(&self) -> &Path { &self.text }

    pub fn bin_dir(&self) -> &Path { &self.bin }

    /// Final resting place of content with digest `hash`.
    pub fn path_for(&self, hash: &str, text: bool) -> PathBuf {
        if text {
            self.text.join(hash)
        } else {
            self.bin.join(hash)
        }
    }

    /// Create the root and both partitions if they are missing.
    pub fn ensure(&self) -> Result<()> {
        ensure_dir(&self.root)?;
        ensure_dir(&self.text)?;
        ensure_dir(&self.bin)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct StoreLayoutBuilder {
    root: Option<PathBuf>,
}

impl StoreLayoutBuilder {
    pub fn new() -> Self { Self { root: None } }

    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    pub fn build(self) -> StoreLayout {
        let root = self.root.unwrap_or_else(|| PathBuf::from("packed"));

        StoreLayout {
            text: root.join(TEXT_DIR),
            bin:  root.join(BIN_DIR),
            root,
        }
    }
}
