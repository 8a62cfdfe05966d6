//! Depth-first walk over an archive tree.
//!
//! Each level is decoded into a canonical tar stream and walked member by
//! member. Nested archives are spooled to a temp file and walked before the
//! next sibling, so a level's entries come out as one contiguous block with
//! every child subtree in place. A level only hands its block upward once its
//! decode finished cleanly; a failed level contributes nothing.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, Write};

use matryoshka_store::{ContentStore, Stored};

use crate::classify::Classifier;
use crate::decode::{Decode, DecodedStream};
use crate::diagnostics::Diagnostics;
use crate::entry::{Entry, normalize_member_name};
use crate::error::{Error, Result};
use crate::format::read_up_to;
use crate::options::ExplodeOptions;
use crate::sniff::Sniffer;

/// Where terminal members end up.
pub trait LeafStore {
    fn store(&self, source: &mut dyn Read) -> matryoshka_store::Result<Stored>;
}

impl LeafStore for ContentStore {
    fn store(&self, source: &mut dyn Read) -> matryoshka_store::Result<Stored> {
        ContentStore::store(self, source)
    }
}

/// Receives finished entries in manifest order.
pub trait EntrySink {
    fn accept(&mut self, entry: Entry) -> Result<()>;
}

impl EntrySink for Vec<Entry> {
    fn accept(&mut self, entry: Entry) -> Result<()> {
        self.push(entry);
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct Outcome {
    pub entries_emitted: u64,
    /// Levels (the top level included) whose decode failed and whose entries
    /// were dropped.
    pub levels_failed: u64,
    /// Members emitted without a hash because storing them failed.
    pub store_failures: u64,
    pub diagnostics: Diagnostics,
}

pub struct Exploder<'a, D: ?Sized, L: ?Sized, S: Sniffer> {
    decoder: &'a D,
    store: &'a L,
    classifier: &'a Classifier<S>,
    options: ExplodeOptions,
}

impl<'a, D, L, S> Exploder<'a, D, L, S>
where
    D: Decode + ?Sized,
    L: LeafStore + ?Sized,
    S: Sniffer,
{
    pub fn new(decoder: &'a D, store: &'a L, classifier: &'a Classifier<S>, options: ExplodeOptions) -> Self {
        Self {
            decoder,
            store,
            classifier,
            options,
        }
    }

    pub fn options(&self) -> &ExplodeOptions {
        &self.options
    }

    /// Walk the archive in `input`, naming it `path` in every entry.
    ///
    /// Returns `Ok` even when the archive itself cannot be decoded; that is
    /// reported through [`Outcome::levels_failed`]. Errors are reserved for
    /// the sink failing and, with `fail_fast`, a member failing to store.
    pub fn explode(&self, input: File, path: &[String], sink: &mut dyn EntrySink) -> Result<Outcome> {
        let mut outcome = Outcome::default();
        for entry in self.level(input, path, 0, &mut outcome)? {
            sink.accept(entry)?;
            outcome.entries_emitted += 1;
        }
        Ok(outcome)
    }

    fn level(&self, input: File, path: &[String], depth: usize, outcome: &mut Outcome) -> Result<Vec<Entry>> {
        tracing::info!(?path, decoder = self.decoder.name(), "unpacking");

        let parent = std::mem::take(&mut outcome.diagnostics);
        let walked = self.decoder.open(input).and_then(|mut stream| {
            let mut entries = Vec::new();
            match self.walk(&mut stream, path, depth, &mut entries, outcome) {
                Ok(()) => stream.finish().map(|()| entries),
                Err(e) => {
                    stream.abort();
                    Err(e)
                }
            }
        });

        let classified = std::mem::replace(&mut outcome.diagnostics, parent);
        if !classified.is_empty() {
            tracing::debug!(
                ?path,
                explored = classified.explored_outer().values().sum::<u64>(),
                rejected = classified.rejected_prefixes().values().sum::<u64>(),
                "level classified"
            );
        }
        outcome.diagnostics.merge(classified);

        match walked {
            Ok(entries) => Ok(entries),
            Err(e) if e.is_local() => {
                tracing::warn!(?path, error = %e, "decode failed, dropping this level");
                outcome.levels_failed += 1;
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    fn walk(
        &self,
        stream: &mut Box<dyn DecodedStream>,
        path: &[String],
        depth: usize,
        entries: &mut Vec<Entry>,
        outcome: &mut Outcome,
    ) -> Result<()> {
        let mut archive = tar::Archive::new(stream);
        for member in archive.entries().map_err(Error::Malformed)? {
            let member = member.map_err(Error::Malformed)?;
            self.member(member, path, depth, entries, outcome)?;
        }
        Ok(())
    }

    fn member<R: Read>(
        &self,
        mut member: tar::Entry<'_, R>,
        path: &[String],
        depth: usize,
        entries: &mut Vec<Entry>,
        outcome: &mut Outcome,
    ) -> Result<()> {
        let kind = member.header().entry_type();
        // pax global headers carry archive-wide attributes, not content.
        if kind.is_dir() || kind.is_pax_global_extensions() {
            return Ok(());
        }

        let mut chain = path.to_vec();
        chain.push(normalize_member_name(&String::from_utf8_lossy(&member.path_bytes())));
        let size = member.size();
        let mode = member.header().mode().map_err(Error::Malformed)?;

        if !(kind.is_file() || kind.is_contiguous() || kind.is_gnu_sparse()) {
            tracing::warn!(path = ?chain, ?kind, "irregular member");
            entries.push(Entry::uncaptured(chain, size, mode));
            return Ok(());
        }

        let mut peek = vec![0u8; self.options.peek_len];
        let mut peeked = read_up_to(&mut member, &mut peek).map_err(Error::Malformed)?;
        let window = self.options.peek_len_for(&peek[..peeked]);
        if peeked == peek.len() && window > peek.len() {
            peek.resize(window, 0);
            peeked += read_up_to(&mut member, &mut peek[peeked..]).map_err(Error::Malformed)?;
        }
        peek.truncate(peeked);

        if self.classifier.should_explore(&peek, &mut outcome.diagnostics) {
            if self.options.may_descend(depth) {
                let nested = match spool(&peek, &mut member) {
                    Ok(file) => file,
                    Err(Error::Spool(e)) => {
                        tracing::warn!(path = ?chain, error = %e, "cannot spool nested archive, skipping it");
                        return Ok(());
                    }
                    Err(e) => return Err(e),
                };
                entries.extend(self.level(nested, &chain, depth + 1, outcome)?);
                return Ok(());
            }
            tracing::warn!(path = ?chain, depth, "nesting limit reached, storing archive as a blob");
        }

        let mut source = Cursor::new(peek).chain(&mut member);
        match self.store.store(&mut source) {
            Ok(stored) => entries.push(Entry::stored(chain, size, mode, stored.hash, stored.text)),
            // The canonical stream broke under the store, not the store itself.
            Err(matryoshka_store::Error::Source(e)) => return Err(Error::Malformed(e)),
            Err(e) if self.options.fail_fast => return Err(Error::Store(e)),
            Err(e) => {
                tracing::warn!(path = ?chain, error = %e, "failed to store member");
                outcome.store_failures += 1;
                entries.push(Entry::uncaptured(chain, size, mode));
            }
        }
        Ok(())
    }
}

/// Copy a whole member into an anonymous seekable file, rewound.
fn spool(peek: &[u8], member: &mut impl Read) -> Result<File> {
    let mut file = tempfile::tempfile().map_err(Error::Spool)?;
    file.write_all(peek).map_err(Error::Spool)?;

    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = match member.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Malformed(e)),
        };
        file.write_all(&buf[..n]).map_err(Error::Spool)?;
    }
    file.rewind().map_err(Error::Spool)?;
    Ok(file)
}
