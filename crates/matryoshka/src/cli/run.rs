use std::fs::File;
use std::io;

use anyhow::{Context, bail};
use matryoshka_archive::{Classifier, DecoderKind, Exploder, InferSniffer, ManifestWriter};
use matryoshka_store::{CompressorKind, ContentStore};

use super::App;
use crate::report;

pub fn run(app: &App) -> anyhow::Result<()> {
    if app.compressor_kind() == CompressorKind::Lz4 && !matryoshka_platform::is_available("lz4") {
        bail!("lz4 is not on PATH; install it or pick another --compressor");
    }
    let bsdtar = app.bsdtar();
    if app.decoder_kind() == DecoderKind::Bsdtar && !bsdtar.is_available() {
        bail!("bsdtar not found; install it, point --bsdtar-dir at it or use --decoder native");
    }

    let compressor = app.compressor_kind().build().context("unusable compressor")?;
    let store = ContentStore::open(&app.store, compressor)
        .with_context(|| format!("cannot open store at {}", app.store.display()))?;
    let input = File::open(&app.archive).with_context(|| format!("cannot open {}", app.archive.display()))?;

    let decoder = app.decoder_kind().build(bsdtar);
    let classifier = Classifier::new(InferSniffer);
    let exploder = Exploder::new(&*decoder, &store, &classifier, app.explode_options());

    let mut manifest = ManifestWriter::new(io::stdout().lock());
    let outcome = exploder
        .explode(input, &[app.archive_name()], &mut manifest)
        .context("run aborted")?;

    report::log_outcome(&outcome);
    Ok(())
}
