use std::io::{self, Read, Seek};

use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar(Compression),
}

/// Stream compression wrapped around a payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Xz,
    Zstd,
    Bzip2,
}

impl Compression {
    /// The compression wrapper announced by the leading magic bytes, if any.
    pub fn wrapping(data: &[u8]) -> Self {
        match data {
            [0x1F, 0x8B, ..] => Self::Gzip,
            [0x28, 0xB5, 0x2F, 0xFD, ..] => Self::Zstd,
            [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00, ..] => Self::Xz,
            [b'B', b'Z', b'h', ..] => Self::Bzip2,
            _ => Self::None,
        }
    }

    /// Wrap `reader` in the matching streaming decoder.
    pub fn decoder<R: Read + 'static>(self, reader: R) -> Result<Box<dyn Read>, Error> {
        match self {
            Self::None => Ok(Box::new(reader)),
            Self::Gzip => Ok(Box::new(flate2::read::GzDecoder::new(reader))),
            #[cfg(feature = "xz")]
            Self::Xz => Ok(Box::new(xz2::read::XzDecoder::new(reader))),
            #[cfg(not(feature = "xz"))]
            Self::Xz => Err(Error::UnsupportedFormat),
            #[cfg(feature = "zstd")]
            Self::Zstd => {
                let decoder = zstd::stream::read::Decoder::new(reader).map_err(|_| Error::Corrupted)?;
                Ok(Box::new(decoder))
            }
            #[cfg(not(feature = "zstd"))]
            Self::Zstd => Err(Error::UnsupportedFormat),
            #[cfg(feature = "bzip2")]
            Self::Bzip2 => Ok(Box::new(bzip2::read::BzDecoder::new(reader))),
            #[cfg(not(feature = "bzip2"))]
            Self::Bzip2 => Err(Error::UnsupportedFormat),
        }
    }
}

pub fn detect_format(data: &[u8]) -> Option<ArchiveFormat> {
    match data {
        [0x50, 0x4B, 0x03, 0x04, ..] | [0x50, 0x4B, 0x05, 0x06, ..] => Some(ArchiveFormat::Zip),
        _ => match Compression::wrapping(data) {
            Compression::None if is_tar_header(data) => Some(ArchiveFormat::Tar(Compression::None)),
            Compression::None => None,
            codec => Some(ArchiveFormat::Tar(codec)),
        },
    }
}

fn is_tar_header(data: &[u8]) -> bool {
    data.len() >= 512 && data[257..262] == *b"ustar"
}

pub fn detect_from_reader<R: Read + Seek>(reader: &mut R) -> io::Result<Option<ArchiveFormat>> {
    let mut header = [0u8; 512];
    let n = read_up_to(reader, &mut header)?;
    reader.rewind()?;
    Ok(detect_format(&header[..n]))
}

/// Fill as much of `buf` as the reader can provide, stopping only at EOF.
pub(crate) fn read_up_to<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
