use std::collections::{BTreeMap, BTreeSet};

use crate::sniff::MimeType;

/// Classifier decisions accumulated over a run, for the end-of-run report.
///
/// Threaded explicitly through the classifier rather than kept in a global,
/// so separate runs (and tests) never share counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    rejected_prefixes: BTreeMap<Vec<u8>, u64>,
    ignored_mime_types: BTreeSet<String>,
    explored_outer: BTreeMap<String, u64>,
    explored_inner: BTreeMap<String, u64>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject_prefix(&mut self, prefix: &[u8]) {
        *self.rejected_prefixes.entry(prefix.to_vec()).or_default() += 1;
    }

    pub fn ignore_mime(&mut self, mime: &MimeType) {
        self.ignored_mime_types.insert(mime.essence().to_owned());
    }

    pub fn explore_outer(&mut self, mime: &MimeType) {
        *self.explored_outer.entry(mime.essence().to_owned()).or_default() += 1;
    }

    pub fn explore_inner(&mut self, mime: &MimeType) {
        *self.explored_inner.entry(mime.essence().to_owned()).or_default() += 1;
    }

    pub fn merge(&mut self, other: Diagnostics) {
        for (prefix, count) in other.rejected_prefixes {
            *self.rejected_prefixes.entry(prefix).or_default() += count;
        }
        self.ignored_mime_types.extend(other.ignored_mime_types);
        for (mime, count) in other.explored_outer {
            *self.explored_outer.entry(mime).or_default() += count;
        }
        for (mime, count) in other.explored_inner {
            *self.explored_inner.entry(mime).or_default() += count;
        }
    }

    pub fn rejected_prefixes(&self) -> &BTreeMap<Vec<u8>, u64> {
        &self.rejected_prefixes
    }

    pub fn ignored_mime_types(&self) -> &BTreeSet<String> {
        &self.ignored_mime_types
    }

    pub fn explored_outer(&self) -> &BTreeMap<String, u64> {
        &self.explored_outer
    }

    pub fn explored_inner(&self) -> &BTreeMap<String, u64> {
        &self.explored_inner
    }

    /// Rejected prefixes, most frequent first, rendered as escaped ASCII.
    pub fn top_rejected_prefixes(&self, limit: usize) -> Vec<(String, u64)> {
        let mut counted: Vec<_> = self
            .rejected_prefixes
            .iter()
            .map(|(prefix, count)| (prefix.escape_ascii().to_string(), *count))
            .collect();
        counted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counted.truncate(limit);
        counted
    }

    pub fn is_empty(&self) -> bool {
        self.rejected_prefixes.is_empty()
            && self.ignored_mime_types.is_empty()
            && self.explored_outer.is_empty()
            && self.explored_inner.is_empty()
    }
}
