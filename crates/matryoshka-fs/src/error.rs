use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create staging file in {dir}: {source}")]
    Stage {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to commit {staged} to {dest}: {source}")]
    Commit {
        staged: PathBuf,
        dest: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} exists and is not a directory")]
    NotADirectory { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
