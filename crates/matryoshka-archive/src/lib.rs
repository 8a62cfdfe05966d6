//! Recursive archive exploding.
//!
//! # Architecture
//!
//! - `classify.rs` - decides whether a member is a nested archive
//! - `sniff.rs` - pluggable MIME sniffing behind the classifier
//! - `decode/` - backends producing one canonical tar stream per level
//! - `explode.rs` - the depth-first walk
//! - `manifest.rs` - JSON-lines output
//! - `entry.rs` - manifest record and member name normalization

pub use classify::{ARCHIVE_TYPES, Classifier};
pub use decode::{BsdtarDecoder, Decode, DecodedStream, DecoderKind, NativeDecoder};
pub use diagnostics::Diagnostics;
pub use entry::{Entry, normalize_member_name};
pub use error::{Error, Result};
pub use explode::{EntrySink, Exploder, LeafStore, Outcome};
pub use format::{ArchiveFormat, Compression, detect_format, detect_from_reader};
pub use manifest::ManifestWriter;
pub use options::ExplodeOptions;
pub use sniff::{InferSniffer, MimeType, Sniffer};

pub mod classify;
pub mod decode;
mod diagnostics;
pub mod entry;
mod error;
pub mod explode;
mod format;
mod manifest;
pub mod options;
pub mod sniff;
