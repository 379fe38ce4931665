//! Observability setup.
//!
//! Structured logging through `tracing-subscriber`. `RUST_LOG` controls the
//! filter (default `info`) and `LOG_FORMAT=json` switches to JSON lines.

use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Service name reported in logs.
pub const SERVICE_NAME: &str = "culture-finder-api";

/// Install the global tracing subscriber writing to stderr.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().with_current_span(false).init();
    } else {
        builder.with_ansi(false).init();
    }
}

/// Log the service identity once tracing is up.
pub async fn init_observability() -> Result<(), Box<dyn std::error::Error>> {
    info!(
        service = SERVICE_NAME,
        version = env!("CARGO_PKG_VERSION"),
        "Observability initialized (structured logging only)"
    );
    Ok(())
}

/// Flush anything buffered before exit.
pub async fn shutdown_observability() {
    info!(service = SERVICE_NAME, "Observability shut down");
}
