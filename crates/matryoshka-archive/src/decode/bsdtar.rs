use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{ChildStdout, Stdio};

use matryoshka_platform::{Command, Helper};

use super::{Decode, DecodedStream};
use crate::{Error, Result};

/// Re-normalises any format libarchive reads into a tar on stdout:
/// `bsdtar -c -f - @-`.
#[derive(Clone, Debug, Default)]
pub struct BsdtarDecoder {
    search_dir: Option<PathBuf>,
}

impl BsdtarDecoder {
    pub const PROGRAM: &'static str = "bsdtar";

    /// Prefer a `bsdtar` found in `dir` over the one on `PATH`.
    pub fn search_at(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dir = Some(dir.into());
        self
    }

    pub fn is_available(&self) -> bool {
        matryoshka_platform::is_available_at(Self::PROGRAM, self.search_dir.as_deref())
    }
}

impl Decode for BsdtarDecoder {
    fn open(&self, input: File) -> Result<Box<dyn DecodedStream>> {
        let mut command = Command::new(Self::PROGRAM).args(["-c", "-f", "-", "@-"]);
        if let Some(dir) = &self.search_dir {
            command = command.search_at(dir.clone());
        }
        let mut helper = command
            .stdin(Stdio::from(input))
            .stdout(Stdio::piped())
            .capture_stderr()
            .spawn()
            .map_err(Error::Decoder)?;
        let stdout = helper.take_stdout().map_err(Error::Decoder)?;
        Ok(Box::new(BsdtarStream { helper, stdout }))
    }

    fn name(&self) -> &str {
        Self::PROGRAM
    }
}

struct BsdtarStream {
    helper: Helper,
    stdout: ChildStdout,
}

impl Read for BsdtarStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stdout.read(buf)
    }
}

impl DecodedStream for BsdtarStream {
    fn finish(self: Box<Self>) -> Result<()> {
        let Self { helper, mut stdout } = *self;
        // The tar reader stops at the end-of-archive marker; bsdtar may still
        // be writing padding and would die of SIGPIPE if we hung up.
        if let Err(e) = io::copy(&mut stdout, &mut io::sink()) {
            helper.abort();
            return Err(Error::Malformed(e));
        }
        drop(stdout);
        helper.wait_success().map_err(Error::Decoder)
    }

    fn abort(self: Box<Self>) {
        let Self { helper, stdout } = *self;
        drop(stdout);
        helper.abort();
    }
}
