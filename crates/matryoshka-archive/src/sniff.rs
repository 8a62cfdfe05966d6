//! Pluggable MIME sniffing.
//!
//! The classifier only asks two questions of a sniffer: what do these raw
//! bytes look like, and what do they look like once a compression wrapper is
//! peeled off. Everything else about the engine is swappable.

use std::borrow::Cow;
use std::fmt;
use std::io::{Cursor, Read};

use matryoshka_verify::is_text;

use crate::format::Compression;

/// Upper bound on bytes inflated from a compressed peek.
const INFLATE_LIMIT: usize = 4096;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MimeType(Cow<'static, str>);

impl MimeType {
    pub const OCTET_STREAM: MimeType = MimeType(Cow::Borrowed("application/octet-stream"));
    pub const TEXT_PLAIN: MimeType = MimeType(Cow::Borrowed("text/plain"));

    pub fn new(essence: impl Into<Cow<'static, str>>) -> Self {
        Self(essence.into())
    }

    /// `type/subtype`, without parameters.
    pub fn essence(&self) -> &str {
        &self.0
    }

    pub fn major(&self) -> &str {
        self.0.split_once('/').map_or(&self.0, |(major, _)| major)
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait Sniffer: Send + Sync {
    /// Type of `bytes` as they are.
    fn sniff(&self, bytes: &[u8]) -> MimeType;

    /// Type of `bytes` after transparently undoing a compression wrapper.
    ///
    /// Falls back to [`Sniffer::sniff`] when there is no wrapper or nothing
    /// could be inflated from the prefix.
    fn sniff_decompressed(&self, bytes: &[u8]) -> MimeType {
        match inflate_prefix(bytes) {
            Some(inner) if !inner.is_empty() => self.sniff(&inner),
            _ => self.sniff(bytes),
        }
    }
}

/// Signature-table sniffer backed by the `infer` crate.
///
/// Unmatched input is reported as `text/plain` when every byte passes the
/// text predicate, `application/octet-stream` otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct InferSniffer;

impl Sniffer for InferSniffer {
    fn sniff(&self, bytes: &[u8]) -> MimeType {
        match infer::get(bytes) {
            Some(kind) => MimeType::new(kind.mime_type()),
            None if !bytes.is_empty() && is_text(bytes) => MimeType::TEXT_PLAIN,
            None => MimeType::OCTET_STREAM,
        }
    }
}

/// Inflate as much of a compressed prefix as the truncated input allows.
///
/// Returns `None` when `bytes` carry no recognised (or no enabled) wrapper.
pub fn inflate_prefix(bytes: &[u8]) -> Option<Vec<u8>> {
    let codec = Compression::wrapping(bytes);
    if codec == Compression::None {
        return None;
    }
    let mut decoder = codec.decoder(Cursor::new(bytes.to_vec())).ok()?;

    let mut out = vec![0u8; INFLATE_LIMIT];
    let mut filled = 0;
    // Truncated input ends in an error; keep whatever came out before it.
    while filled < out.len() {
        match decoder.read(&mut out[filled..]) {
            Ok(0) | Err(_) => break,
            Ok(n) => filled += n,
        }
    }
    out.truncate(filled);
    Some(out)
}
