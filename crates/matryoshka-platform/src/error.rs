use std::process::ExitStatus;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("command not found: {cmd}")]
    CommandNotFound { cmd: String },

    #[error("command failed: {cmd}, source: {source}")]
    CommandFailed { cmd: String, source: std::io::Error },

    #[error("helper `{cmd}` exited with {status}{}", stderr_suffix(.stderr))]
    HelperFailed {
        cmd: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("helper `{cmd}` has no {stream} pipe")]
    MissingPipe { cmd: String, stream: &'static str },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}
