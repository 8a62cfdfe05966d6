//! Content-addressed storage for terminal archive members.
//!
//! Each stream is hashed, classified as text or binary, and compressed in a
//! single pass, then renamed into `text/` or `bin/` under its SHA-256.

pub use compress::{CompressSink, Compressor, CompressorKind, ExternalCompressor};
#[cfg(feature = "gzip")]
pub use compress::GzipCompressor;
#[cfg(feature = "zstd")]
pub use compress::ZstdCompressor;
pub use error::{Error, Result};
pub use layout::{BIN_DIR, StoreLayout, TEXT_DIR};
pub use store::{ContentStore, Stored};

pub mod compress;
mod error;
pub mod layout;
mod store;
