//! Tracing subscriber setup shared by binaries and examples.

/// Initialize tracing with an env-filter (`RUST_LOG`).
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}
