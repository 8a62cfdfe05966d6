/// Whether `c` disqualifies a stream from being text.
///
/// Tab and the 10..=13 band (LF, VT, FF, CR) are allowed; every other
/// control character below space is not.
#[inline]
pub fn is_binary_byte(c: u8) -> bool {
    c < 9 || (14..32).contains(&c)
}

pub fn is_text(buf: &[u8]) -> bool {
    !buf.iter().copied().any(is_binary_byte)
}

/// One-way text/binary classification folded over a byte stream.
///
/// Starts as text and flips to binary on the first disqualifying byte. It
/// never flips back, and once binary the remaining chunks are not scanned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextLatch {
    text: bool,
}

impl Default for TextLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLatch {
    pub fn new() -> Self {
        Self { text: true }
    }

    pub fn observe(&mut self, chunk: &[u8]) {
        if self.text && !is_text(chunk) {
            self.text = false;
        }
    }

    pub fn is_text(&self) -> bool {
        self.text
    }
}
