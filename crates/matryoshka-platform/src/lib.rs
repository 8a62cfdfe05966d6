pub use command::{Command, Helper, is_available, is_available_at};
pub use error::{Error, Result};

pub mod command;
mod error;
