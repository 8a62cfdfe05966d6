use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("store filesystem error: {0}")]
    Fs(#[from] matryoshka_fs::Error),

    #[error("failed to read content: {0}")]
    Source(#[source] io::Error),

    #[error("compressor failed: {0}")]
    CompressFailed(#[source] matryoshka_platform::Error),

    #[error("failed to write compressed stream: {0}")]
    Compress(#[source] io::Error),

    #[error("compressor `{0}` is not available in this build")]
    UnsupportedCompressor(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
