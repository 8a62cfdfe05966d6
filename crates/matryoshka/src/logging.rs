use tracing_subscriber::EnvFilter;

/// Human-readable logs on stderr; stdout carries the manifest.
///
/// `RUST_LOG` wins over `level` when set.
pub fn init_console(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
