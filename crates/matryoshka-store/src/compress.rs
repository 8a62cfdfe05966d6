//! Compressors that write one stream into one named file.

use std::io::{self, Write};
use std::path::Path;
use std::process::{ChildStdin, Stdio};

use matryoshka_platform::{Command, Helper};

use crate::error::{Error, Result};

/// Starts a compression of one stream into `dest`.
pub trait Compressor: Send + Sync {
    fn begin(&self, dest: &Path) -> Result<Box<dyn CompressSink>>;

    fn name(&self) -> &str;
}

/// Write side of a running compression.
pub trait CompressSink: Write {
    /// Flush everything and report whether the compressed file is complete.
    fn finish(self: Box<Self>) -> Result<()>;

    /// Give up; the destination file is left in an unspecified state.
    fn abort(self: Box<Self>);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CompressorKind {
    #[default]
    Lz4,
    Gzip,
    Zstd,
}

impl CompressorKind {
    pub fn build(self) -> Result<Box<dyn Compressor>> {
        match self {
            Self::Lz4 => Ok(Box::new(ExternalCompressor::lz4())),
            #[cfg(feature = "gzip")]
            Self::Gzip => Ok(Box::new(GzipCompressor::default())),
            #[cfg(not(feature = "gzip"))]
            Self::Gzip => Err(Error::UnsupportedCompressor("gzip")),
            #[cfg(feature = "zstd")]
            Self::Zstd => Ok(Box::new(ZstdCompressor::default())),
            #[cfg(not(feature = "zstd"))]
            Self::Zstd => Err(Error::UnsupportedCompressor("zstd")),
        }
    }
}

/// Compression through a helper process reading stdin and writing a named
/// output file. Its exit status decides whether the output is usable.
#[derive(Clone, Debug)]
pub struct ExternalCompressor {
    program: String,
    args: Vec<String>,
}

impl ExternalCompressor {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `lz4 -5 -q -f - <dest>`; `-f` because the staged destination already exists.
    pub fn lz4() -> Self {
        Self::new("lz4", ["-5", "-q", "-f", "-"])
    }
}

impl Compressor for ExternalCompressor {
    fn begin(&self, dest: &Path) -> Result<Box<dyn CompressSink>> {
        let mut helper = Command::new(self.program.as_str())
            .args(&self.args)
            .arg(dest)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .capture_stderr()
            .spawn()
            .map_err(Error::CompressFailed)?;
        let stdin = helper.take_stdin().map_err(Error::CompressFailed)?;
        Ok(Box::new(ExternalSink { helper, stdin }))
    }

    fn name(&self) -> &str {
        &self.program
    }
}

struct ExternalSink {
    helper: Helper,
    stdin: ChildStdin,
}

impl Write for ExternalSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stdin.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdin.flush()
    }
}

impl CompressSink for ExternalSink {
    fn finish(self: Box<Self>) -> Result<()> {
        let Self { helper, stdin } = *self;
        drop(stdin);
        helper.wait_success().map_err(|e| {
            tracing::warn!(error = %e, "compressor failed");
            Error::CompressFailed(e)
        })
    }

    fn abort(self: Box<Self>) {
        let Self { helper, stdin } = *self;
        drop(stdin);
        helper.abort();
    }
}

#[cfg(feature = "gzip")]
#[derive(Clone, Copy, Debug)]
pub struct GzipCompressor {
    level: u32,
}

#[cfg(feature = "gzip")]
impl Default for GzipCompressor {
    fn default() -> Self {
        Self { level: 6 }
    }
}

#[cfg(feature = "gzip")]
impl GzipCompressor {
    pub fn level(mut self, level: u32) -> Self {
        self.level = level.min(9);
        self
    }
}

#[cfg(feature = "gzip")]
impl Compressor for GzipCompressor {
    fn begin(&self, dest: &Path) -> Result<Box<dyn CompressSink>> {
        let file = open_dest(dest)?;
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::new(self.level));
        Ok(Box::new(GzipSink(encoder)))
    }

    fn name(&self) -> &str {
        "gzip"
    }
}

#[cfg(feature = "gzip")]
struct GzipSink(flate2::write::GzEncoder<std::fs::File>);

#[cfg(feature = "gzip")]
impl Write for GzipSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

#[cfg(feature = "gzip")]
impl CompressSink for GzipSink {
    fn finish(self: Box<Self>) -> Result<()> {
        let file = self.0.finish().map_err(Error::Compress)?;
        file.sync_all().map_err(Error::Compress)
    }

    fn abort(self: Box<Self>) {}
}

#[cfg(feature = "zstd")]
#[derive(Clone, Copy, Debug)]
pub struct ZstdCompressor {
    level: i32,
}

#[cfg(feature = "zstd")]
impl Default for ZstdCompressor {
    fn default() -> Self {
        Self { level: 3 }
    }
}

#[cfg(feature = "zstd")]
impl ZstdCompressor {
    pub fn level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }
}

#[cfg(feature = "zstd")]
impl Compressor for ZstdCompressor {
    fn begin(&self, dest: &Path) -> Result<Box<dyn CompressSink>> {
        let file = open_dest(dest)?;
        let encoder = zstd::stream::write::Encoder::new(file, self.level).map_err(Error::Compress)?;
        Ok(Box::new(ZstdSink(encoder)))
    }

    fn name(&self) -> &str {
        "zstd"
    }
}

#[cfg(feature = "zstd")]
struct ZstdSink(zstd::stream::write::Encoder<'static, std::fs::File>);

#[cfg(feature = "zstd")]
impl Write for ZstdSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

#[cfg(feature = "zstd")]
impl CompressSink for ZstdSink {
    fn finish(self: Box<Self>) -> Result<()> {
        let file = self.0.finish().map_err(Error::Compress)?;
        file.sync_all().map_err(Error::Compress)
    }

    fn abort(self: Box<Self>) {}
}

#[cfg(any(feature = "gzip", feature = "zstd"))]
fn open_dest(dest: &Path) -> Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dest)
        .map_err(Error::Compress)
}
