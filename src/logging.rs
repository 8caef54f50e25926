use tracing_subscriber::EnvFilter;

/// Initialize tracing to stderr. Quiet by default; `RUST_LOG` overrides
/// (e.g. `RUST_LOG=csvpeek=debug`). ANSI is off so redirected stderr
/// stays clean.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .compact()
        .init();
}
