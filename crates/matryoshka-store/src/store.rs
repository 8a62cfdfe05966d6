use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use matryoshka_fs::{StageOptions, StagedFile};
use matryoshka_verify::{InspectingReader, Sha256Hasher};

use crate::compress::{CompressSink, Compressor};
use crate::error::{Error, Result};
use crate::layout::StoreLayout;

const CHUNK_SIZE: usize = 16 * 1024;

/// Outcome of storing one stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stored {
    /// Lowercase hex SHA-256 of the uncompressed content.
    pub hash: String,
    pub text: bool,
    pub bytes: u64,
}

/// Content-addressed store split into text and binary partitions.
///
/// Content is keyed purely by its digest, so writers never coordinate: two
/// writers of the same bytes rename identical files onto the same path.
pub struct ContentStore {
    layout: StoreLayout,
    compressor: Box<dyn Compressor>,
}

impl ContentStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>, compressor: Box<dyn Compressor>) -> Result<Self> {
        let layout = StoreLayout::builder().root(root.as_ref()).build();
        layout.ensure()?;
        Ok(Self { layout, compressor })
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Digest, classify and compress `source` in one pass, then commit it
    /// under `<root>/<text|bin>/<hash>`.
    ///
    /// Nothing is committed unless the compressor reports success; the
    /// staged file is removed on every error path.
    pub fn store(&self, source: &mut dyn Read) -> Result<Stored> {
        let staged = StagedFile::new_in(self.layout.root(), StageOptions::new())?;
        let mut sink = self.compressor.begin(staged.path())?;
        let mut reader = InspectingReader::new(source, Sha256Hasher::new());

        if let Err(e) = pump(&mut reader, &mut sink) {
            return Err(match e {
                Pumped::Read(e) => {
                    sink.abort();
                    Error::Source(e)
                }
                // The helper closing its stdin early means it failed; its
                // exit status says more than the broken pipe does.
                Pumped::Write(e) if e.kind() == ErrorKind::BrokenPipe => match sink.finish() {
                    Err(failed) => failed,
                    Ok(()) => Error::Compress(e),
                },
                Pumped::Write(e) => {
                    sink.abort();
                    Error::Compress(e)
                }
            });
        }
        sink.finish()?;

        let inspection = reader.finish();
        let hash = inspection.hex();
        let dest = self.layout.path_for(&hash, inspection.text);
        staged.commit(&dest)?;

        tracing::trace!(%hash, text = inspection.text, bytes = inspection.bytes, "stored");
        Ok(Stored {
            hash,
            text: inspection.text,
            bytes: inspection.bytes,
        })
    }
}

enum Pumped {
    Read(std::io::Error),
    Write(std::io::Error),
}

fn pump(reader: &mut impl Read, sink: &mut Box<dyn CompressSink>) -> std::result::Result<(), Pumped> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Pumped::Read(e)),
        };
        sink.write_all(&buf[..n]).map_err(Pumped::Write)?;
    }
}
