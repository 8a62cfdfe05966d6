use std::io::Write;

use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::explode::EntrySink;

/// Writes one JSON object per line, flushed as soon as it is written.
#[derive(Debug)]
pub struct ManifestWriter<W: Write> {
    out: W,
    written: u64,
}

impl<W: Write> ManifestWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn emit(&mut self, entry: &Entry) -> Result<()> {
        serde_json::to_writer(&mut self.out, entry).map_err(|e| Error::Emit(e.into()))?;
        self.out.write_all(b"\n").map_err(Error::Emit)?;
        self.out.flush().map_err(Error::Emit)?;
        self.written += 1;
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EntrySink for ManifestWriter<W> {
    fn accept(&mut self, entry: Entry) -> Result<()> {
        self.emit(&entry)
    }
}
