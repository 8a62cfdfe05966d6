//! Decode backends: anything that can turn one archive file into a single
//! canonical tar stream.

use std::fs::File;
use std::io::Read;

use crate::Result;

mod bsdtar;
mod native;

pub use bsdtar::BsdtarDecoder;
pub use native::NativeDecoder;

pub trait Decode {
    /// Start decoding `input`, positioned at its first byte.
    fn open(&self, input: File) -> Result<Box<dyn DecodedStream>>;

    fn name(&self) -> &str;
}

/// The canonical tar stream of one archive level.
pub trait DecodedStream: Read {
    /// Drain what is left and report whether the decode as a whole succeeded.
    fn finish(self: Box<Self>) -> Result<()>;

    /// Stop decoding without caring about the outcome.
    fn abort(self: Box<Self>);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DecoderKind {
    /// `bsdtar` when it can be found, the native decoder otherwise.
    #[default]
    Auto,
    Bsdtar,
    Native,
}

impl DecoderKind {
    /// `bsdtar` carries where to look for the helper.
    pub fn build(self, bsdtar: BsdtarDecoder) -> Box<dyn Decode> {
        match self {
            Self::Auto if bsdtar.is_available() => Box::new(bsdtar),
            Self::Auto => {
                tracing::warn!("bsdtar not found, using the native decoder");
                Box::new(NativeDecoder)
            }
            Self::Bsdtar => Box::new(bsdtar),
            Self::Native => Box::new(NativeDecoder),
        }
    }
}
