//! Single-pass content inspection.
//!
//! Computes a digest and a text/binary classification while data streams
//! through, so stored content never has to be read twice.
//!
//! # Example
//!
//! ```
//! use matryoshka_verify::{InspectingReader, Sha256Hasher};
//!
//! let mut reader = InspectingReader::new(&b"hi\n"[..], Sha256Hasher::new());
//! std::io::copy(&mut reader, &mut std::io::sink()).unwrap();
//!
//! let inspection = reader.finish();
//! assert!(inspection.text);
//! assert_eq!(inspection.hex(), Sha256Hasher::hex_digest(b"hi\n"));
//! ```

pub use self::hasher::Hasher;
pub use self::reader::{Inspection, InspectingReader};
pub use self::text::{TextLatch, is_binary_byte, is_text};

#[cfg(feature = "sha256")]
pub use self::hasher::Sha256Hasher;

mod hasher;
mod reader;
mod text;
