use crate::format::Compression;

/// Peek windows below this are too short to sniff reliably.
pub const MIN_PEEK_LEN: usize = 64;

/// Large enough to include the POSIX tar magic at offset 257.
pub const DEFAULT_PEEK_LEN: usize = 512;

/// bzip2 and zstd only emit output after a whole block, so a compressed
/// member is peeked far enough to cover its first block.
pub const DEFAULT_WRAPPED_PEEK_LEN: usize = 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExplodeOptions {
    /// Bytes of each member handed to the classifier.
    pub peek_len: usize,
    /// Bytes peeked instead when the member starts with compression magic.
    pub wrapped_peek_len: usize,
    /// Deepest nesting level that is still decoded; the top-level archive is
    /// level 0. `None` means unbounded.
    pub max_depth: Option<usize>,
    /// Abort the run on the first member that cannot be stored.
    pub fail_fast: bool,
}

impl Default for ExplodeOptions {
    fn default() -> Self {
        Self {
            peek_len: DEFAULT_PEEK_LEN,
            wrapped_peek_len: DEFAULT_WRAPPED_PEEK_LEN,
            max_depth: None,
            fail_fast: false,
        }
    }
}

impl ExplodeOptions {
    pub fn peek_len(mut self, len: usize) -> Self {
        self.peek_len = len.max(MIN_PEEK_LEN);
        self
    }

    pub fn wrapped_peek_len(mut self, len: usize) -> Self {
        self.wrapped_peek_len = len;
        self
    }

    /// Peek window for a member whose first bytes are `head`.
    pub fn peek_len_for(&self, head: &[u8]) -> usize {
        match Compression::wrapping(head) {
            Compression::None => self.peek_len,
            _ => self.wrapped_peek_len.max(self.peek_len),
        }
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Whether an archive found at `depth` may be opened as level `depth + 1`.
    pub fn may_descend(&self, depth: usize) -> bool {
        self.max_depth.is_none_or(|max| depth < max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ExplodeOptions::default();
        assert_eq!(options.peek_len, 512);
        assert_eq!(options.wrapped_peek_len, 1024 * 1024);
        assert_eq!(options.max_depth, None);
        assert!(!options.fail_fast);
        assert!(options.may_descend(10_000));
    }

    #[test]
    fn peek_never_below_minimum() {
        assert_eq!(ExplodeOptions::default().peek_len(8).peek_len, MIN_PEEK_LEN);
        assert_eq!(ExplodeOptions::default().peek_len(4096).peek_len, 4096);
    }

    #[test]
    fn compressed_members_get_the_longer_window() {
        let options = ExplodeOptions::default();
        assert_eq!(options.peek_len_for(b"BZh91AY&SY"), DEFAULT_WRAPPED_PEEK_LEN);
        assert_eq!(options.peek_len_for(&[0x1F, 0x8B, 0x08]), DEFAULT_WRAPPED_PEEK_LEN);
        assert_eq!(options.peek_len_for(b"plain text"), DEFAULT_PEEK_LEN);

        let narrow = ExplodeOptions::default().peek_len(4096).wrapped_peek_len(16);
        assert_eq!(narrow.peek_len_for(b"BZh9"), 4096);
    }

    #[test]
    fn depth_limit() {
        let options = ExplodeOptions::default().max_depth(1);
        assert!(options.may_descend(0));
        assert!(!options.may_descend(1));

        assert!(!ExplodeOptions::default().max_depth(0).may_descend(0));
    }
}
