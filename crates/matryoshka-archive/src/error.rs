use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("decoder failed: {0}")]
    Decoder(#[source] matryoshka_platform::Error),

    #[error("canonical stream is malformed: {0}")]
    Malformed(#[source] io::Error),

    #[error("unsupported archive format")]
    UnsupportedFormat,

    #[error("archive is corrupted")]
    Corrupted,

    #[error("failed to spool nested archive: {0}")]
    Spool(#[source] io::Error),

    #[error("failed to store member: {0}")]
    Store(#[from] matryoshka_store::Error),

    #[error("failed to write manifest record: {0}")]
    Emit(#[source] io::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Errors that only cost the archive level they happen in.
    ///
    /// Anything else aborts the whole run.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Decoder(_) | Self::Malformed(_) | Self::UnsupportedFormat | Self::Corrupted | Self::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
