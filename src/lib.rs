pub mod catalog;
pub mod config;
pub mod fetch;
pub mod images;
pub mod parse;
pub mod render;

/// Shared `tracing` setup for the binaries: `RUST_LOG` plus a `LOG_LEVEL` directive.
pub fn init_logging() {
    use tracing::Level;
    use tracing_subscriber::{fmt, EnvFilter};

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .with_writer(std::io::stderr)
        .init();
}
