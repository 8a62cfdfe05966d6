use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use matryoshka_archive::{BsdtarDecoder, DecoderKind, ExplodeOptions, options::DEFAULT_PEEK_LEN};
use matryoshka_store::CompressorKind;

#[derive(Clone, Debug, Parser)]
#[command(name = "matryoshka", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct App {
    /// Archive to explode. Printed as given as the first segment of every name.
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Root of the content store (`text/` and `bin/` live below it).
    #[arg(long, value_name = "DIR", env = "MATRYOSHKA_STORE", default_value = "packed")]
    pub store: PathBuf,

    /// Decode helper; bsdtar when available, native otherwise.
    #[arg(long, value_enum, env = "MATRYOSHKA_DECODER")]
    pub decoder: Option<DecoderArg>,

    /// Directory searched for `bsdtar` before `PATH`.
    #[arg(long, value_name = "DIR", env = "MATRYOSHKA_BSDTAR_DIR")]
    pub bsdtar_dir: Option<PathBuf>,

    #[arg(long, value_enum, env = "MATRYOSHKA_COMPRESSOR", default_value_t = CompressorArg::Lz4)]
    pub compressor: CompressorArg,

    /// Deepest nesting level to decode; deeper archives are stored as blobs.
    #[arg(long, value_name = "N", env = "MATRYOSHKA_MAX_DEPTH")]
    pub max_depth: Option<usize>,

    /// Bytes of each member used to decide whether it is an archive.
    #[arg(long, value_name = "BYTES", env = "MATRYOSHKA_PEEK", default_value_t = DEFAULT_PEEK_LEN)]
    pub peek: usize,

    /// Abort on the first member that cannot be stored.
    #[arg(long, env = "MATRYOSHKA_FAIL_FAST")]
    pub fail_fast: bool,

    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DecoderArg {
    Bsdtar,
    Native,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CompressorArg {
    Lz4,
    Gzip,
    Zstd,
}

impl App {
    pub fn decoder_kind(&self) -> DecoderKind {
        match self.decoder {
            None => DecoderKind::Auto,
            Some(DecoderArg::Bsdtar) => DecoderKind::Bsdtar,
            Some(DecoderArg::Native) => DecoderKind::Native,
        }
    }

    pub fn bsdtar(&self) -> BsdtarDecoder {
        match &self.bsdtar_dir {
            Some(dir) => BsdtarDecoder::default().search_at(dir),
            None => BsdtarDecoder::default(),
        }
    }

    pub fn compressor_kind(&self) -> CompressorKind {
        match self.compressor {
            CompressorArg::Lz4 => CompressorKind::Lz4,
            CompressorArg::Gzip => CompressorKind::Gzip,
            CompressorArg::Zstd => CompressorKind::Zstd,
        }
    }

    pub fn explode_options(&self) -> ExplodeOptions {
        let options = ExplodeOptions::default()
            .peek_len(self.peek)
            .fail_fast(self.fail_fast);
        match self.max_depth {
            Some(depth) => options.max_depth(depth),
            None => options,
        }
    }

    /// First path segment of every manifest entry.
    pub fn archive_name(&self) -> String {
        self.archive.to_string_lossy().into_owned()
    }

    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        App::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let app = App::try_parse_from(["matryoshka", "pkg.tar.gz"]).unwrap();
        assert_eq!(app.archive_name(), "pkg.tar.gz");
        assert_eq!(app.store, PathBuf::from("packed"));
        assert_eq!(app.decoder_kind(), DecoderKind::Auto);
        assert_eq!(app.bsdtar_dir, None);
        assert_eq!(app.compressor_kind(), CompressorKind::Lz4);
        assert_eq!(app.explode_options(), ExplodeOptions::default());
        assert_eq!(app.log_level(), "info");
    }

    #[test]
    fn every_flag() {
        let app = App::try_parse_from([
            "matryoshka",
            "--store",
            "/srv/store",
            "--decoder",
            "native",
            "--bsdtar-dir",
            "/opt/libarchive/bin",
            "--compressor",
            "gzip",
            "--max-depth",
            "3",
            "--peek",
            "1024",
            "--fail-fast",
            "-vv",
            "in.zip",
        ])
        .unwrap();
        assert_eq!(app.store, PathBuf::from("/srv/store"));
        assert_eq!(app.decoder_kind(), DecoderKind::Native);
        assert_eq!(app.bsdtar_dir, Some(PathBuf::from("/opt/libarchive/bin")));
        assert_eq!(app.compressor_kind(), CompressorKind::Gzip);
        let options = app.explode_options();
        assert_eq!(options.max_depth, Some(3));
        assert_eq!(options.peek_len, 1024);
        assert!(options.fail_fast);
        assert_eq!(app.log_level(), "trace");
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        assert!(App::try_parse_from(["matryoshka", "-q", "-v", "a.tar"]).is_err());
        let app = App::try_parse_from(["matryoshka", "-q", "a.tar"]).unwrap();
        assert_eq!(app.log_level(), "warn");
    }

    #[test]
    fn archive_is_required() {
        assert!(App::try_parse_from(["matryoshka"]).is_err());
    }
}
