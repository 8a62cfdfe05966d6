//! Staged files and atomic placement.
//!
//! A [`StagedFile`] is created next to its final destination and renamed into
//! place in one step, so readers of the destination directory never observe
//! a partially written file.

mod error;
pub mod primitives;

pub use error::{Error, Result};
pub use primitives::{StageOptions, StagedFile, ensure_dir};
