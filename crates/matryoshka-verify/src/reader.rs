use std::io::{self, Read};

use crate::{Hasher, TextLatch};

/// Streaming reader that digests and classifies data as it passes through.
///
/// Every chunk handed to the caller has already been fed to the hasher and
/// the text latch, so one pass over the source yields both the content and
/// its identity.
pub struct InspectingReader<R, H> {
    reader: R,
    hasher: H,
    latch: TextLatch,
    bytes: u64,
}

/// What an [`InspectingReader`] learned about the bytes it passed along.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inspection {
    pub digest: Vec<u8>,
    pub text: bool,
    pub bytes: u64,
}

impl Inspection {
    /// Lowercase hex rendering of the digest.
    pub fn hex(&self) -> String {
        hex::encode(&self.digest)
    }
}

impl<R, H> InspectingReader<R, H> {
    pub fn new(reader: R, hasher: H) -> Self {
        Self {
            reader,
            hasher,
            latch: TextLatch::new(),
            bytes: 0,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes
    }
}

impl<R: Read, H: Hasher> InspectingReader<R, H> {
    pub fn finish(self) -> Inspection {
        Inspection {
            digest: self.hasher.finalize(),
            text: self.latch.is_text(),
            bytes: self.bytes,
        }
    }
}

impl<R: Read, H: Hasher> Read for InspectingReader<R, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n > 0 {
            self.hasher.update(&buf[..n]);
            self.latch.observe(&buf[..n]);
            self.bytes += n as u64;
        }
        Ok(n)
    }
}
