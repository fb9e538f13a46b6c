use tracing_subscriber::EnvFilter;

/// Console logging, filterable via RUST_LOG, defaulting to info.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();
}
