use crate::diagnostics::Diagnostics;
use crate::sniff::{InferSniffer, MimeType, Sniffer};

/// Fewer bytes than this carry too little signal to call anything an archive.
pub const MIN_PEEK: usize = 8;

/// Length of the prefix recorded for rejected members.
const PREFIX_KEY_LEN: usize = 6;

/// Container types the decoders can turn into a canonical tar stream.
pub const ARCHIVE_TYPES: &[&str] = &["application/java-archive", "application/x-tar", "application/zip"];

/// Major types that are never worth decoding.
const REJECTED_MAJORS: &[&str] = &["text", "image", "audio", "message"];

/// Decides whether a member is a nested archive worth descending into.
#[derive(Debug, Default)]
pub struct Classifier<S: Sniffer = InferSniffer> {
    sniffer: S,
}

impl<S: Sniffer> Classifier<S> {
    pub fn new(sniffer: S) -> Self {
        Self { sniffer }
    }

    pub fn sniffer(&self) -> &S {
        &self.sniffer
    }

    /// Classify a member from the first bytes of its content.
    ///
    /// Never fails: anything ambiguous is treated as "not an archive".
    pub fn should_explore(&self, peek: &[u8], diagnostics: &mut Diagnostics) -> bool {
        if peek.len() < MIN_PEEK {
            return false;
        }
        if is_known_non_archive(peek) {
            tracing::debug!(prefix = %prefix_key(peek).escape_ascii(), "rejected by prefix");
            return false;
        }

        let outer = self.sniffer.sniff(peek);
        if REJECTED_MAJORS.contains(&outer.major()) {
            tracing::debug!(mime = %outer, "rejected by outer type");
            diagnostics.reject_prefix(prefix_key(peek));
            return false;
        }
        if is_archive_type(&outer) {
            tracing::info!(mime = %outer, "outer archive detected");
            diagnostics.explore_outer(&outer);
            return true;
        }

        let inner = self.sniffer.sniff_decompressed(peek);
        if is_archive_type(&inner) {
            tracing::info!(outer = %outer, inner = %inner, "inner archive detected");
            diagnostics.explore_inner(&inner);
            return true;
        }

        tracing::debug!(mime = %inner, "not an archive");
        diagnostics.ignore_mime(&inner);
        diagnostics.reject_prefix(prefix_key(peek));
        false
    }
}

pub fn is_archive_type(mime: &MimeType) -> bool {
    ARCHIVE_TYPES.contains(&mime.essence())
}

/// Formats whose leading bytes generic sniffers tend to mistake for containers.
pub fn is_known_non_archive(peek: &[u8]) -> bool {
    matches!(peek, [b'#' | b'<' | b'\n', ..])
        || matches!(peek, [b'/', b'*' | b'/', ..] | [0xCA, 0xFE, ..] | [b'\'', b'\\', ..])
        || peek.starts_with(b"\x89PNG")
        || [b"GIF87a", b"GIF89a", b"@echo ", b"packag", b"import", b"Manife"]
            .iter()
            .any(|marker| peek.starts_with(*marker))
}

fn prefix_key(peek: &[u8]) -> &[u8] {
    &peek[..peek.len().min(PREFIX_KEY_LEN)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    fn classify(peek: &[u8]) -> (bool, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let explore = Classifier::<InferSniffer>::default().should_explore(peek, &mut diagnostics);
        (explore, diagnostics)
    }

    fn tar_block() -> Vec<u8> {
        let mut block = vec![0u8; 512];
        block[..9].copy_from_slice(b"hello.txt");
        block[257..263].copy_from_slice(b"ustar\0");
        block
    }

    #[test]
    fn short_peek_is_never_an_archive() {
        assert!(!classify(b"PK\x03\x04").0);
        assert!(!classify(b"").0);
    }

    #[test]
    fn fast_path_rejections() {
        for peek in [
            &b"#!/bin/sh\nexit 0\n"[..],
            b"<?xml version=\"1.0\"?>",
            b"\nleading newline",
            b"/* C comment */",
            b"// line comment",
            b"\xCA\xFE\xBA\xBE\x00\x00\x00\x34",
            b"'\\\" t\n.TH FOO 1",
            b"\x89PNG\r\n\x1a\n\x00\x00",
            b"GIF89a\x01\x00\x01\x00",
            b"GIF87a\x01\x00\x01\x00",
            b"@echo off\r\n",
            b"package main\n",
            b"import os\nimport sys\n",
            b"Manifest-Version: 1.0\n",
        ] {
            let (explore, diagnostics) = classify(peek);
            assert!(!explore, "{:?}", peek.escape_ascii().to_string());
            assert!(diagnostics.is_empty());
        }
    }

    #[test]
    fn zip_is_explored() {
        let (explore, diagnostics) = classify(b"PK\x03\x04\x14\x00\x00\x00\x08\x00more");
        assert!(explore);
        assert_eq!(diagnostics.explored_outer()["application/zip"], 1);
    }

    #[test]
    fn tar_is_explored() {
        assert!(classify(&tar_block()).0);
    }

    #[test]
    fn gzipped_tar_is_explored_via_inner_type() {
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&tar_block()).unwrap();
        let wrapped = encoder.finish().unwrap();

        let (explore, diagnostics) = classify(&wrapped);
        assert!(explore);
        assert_eq!(diagnostics.explored_inner()["application/x-tar"], 1);
    }

    #[test]
    #[cfg(feature = "xz")]
    fn xz_wrapped_tar_is_explored() {
        let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
        encoder.write_all(&tar_block()).unwrap();
        let wrapped = encoder.finish().unwrap();

        let (explore, diagnostics) = classify(&wrapped);
        assert!(explore);
        assert_eq!(diagnostics.explored_inner()["application/x-tar"], 1);
    }

    #[test]
    #[cfg(feature = "bzip2")]
    fn bzip2_wrapped_tar_is_explored() {
        let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        encoder.write_all(&tar_block()).unwrap();
        let wrapped = encoder.finish().unwrap();

        let (explore, diagnostics) = classify(&wrapped);
        assert!(explore);
        assert_eq!(diagnostics.explored_inner()["application/x-tar"], 1);
    }

    #[test]
    #[cfg(feature = "zstd")]
    fn zstd_wrapped_tar_is_explored() {
        let wrapped = zstd::encode_all(&tar_block()[..], 3).unwrap();

        let (explore, diagnostics) = classify(&wrapped);
        assert!(explore);
        assert_eq!(diagnostics.explored_inner()["application/x-tar"], 1);
    }

    #[test]
    #[cfg(feature = "bzip2")]
    fn bzip2_payload_without_tar_is_ignored() {
        let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        encoder.write_all(b"\x00\x01\x02\x03 binary log payload").unwrap();
        let wrapped = encoder.finish().unwrap();

        let (explore, diagnostics) = classify(&wrapped);
        assert!(!explore);
        assert_eq!(diagnostics.rejected_prefixes()[&wrapped[..6].to_vec()], 1);
        assert!(wrapped.starts_with(b"BZh"));
    }

    #[test]
    fn text_records_prefix() {
        let (explore, diagnostics) = classify(b"Testing, testing,\n123.");
        assert!(!explore);
        assert_eq!(diagnostics.rejected_prefixes()[&b"Testin".to_vec()], 1);
    }

    #[test]
    fn plain_gzip_payload_is_ignored() {
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"\x00\x01\x02\x03 binary log payload").unwrap();
        let wrapped = encoder.finish().unwrap();

        let (explore, diagnostics) = classify(&wrapped);
        assert!(!explore);
        assert!(diagnostics.ignored_mime_types().contains("application/octet-stream"));
    }

    #[test]
    fn elf_is_ignored() {
        let (explore, diagnostics) = classify(b"\x7fELF\x02\x01\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00");
        assert!(!explore);
        assert_eq!(diagnostics.ignored_mime_types().len(), 1);
        assert_eq!(diagnostics.rejected_prefixes()[&b"\x7fELF\x02\x01".to_vec()], 1);
    }

    proptest! {
        #[test]
        fn short_input_always_false(bytes in proptest::collection::vec(any::<u8>(), 0..MIN_PEEK)) {
            prop_assert!(!classify(&bytes).0);
        }

        #[test]
        fn total_on_arbitrary_input(bytes in proptest::collection::vec(any::<u8>(), MIN_PEEK..600)) {
            let _ = classify(&bytes);
        }

        #[test]
        fn total_on_gzip_magic(tail in proptest::collection::vec(any::<u8>(), 6..200)) {
            let mut bytes = vec![0x1F, 0x8B];
            bytes.extend(tail);
            let _ = classify(&bytes);
        }
    }
}
