pub mod dir;
pub mod staged;

pub use dir::ensure_dir;
pub use staged::{StageOptions, StagedFile};
