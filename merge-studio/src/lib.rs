//! Application layer for the image merger.
//!
//! Loads configuration, sets up tracing, and wires a [`MergeSession`] to a
//! background [`Recomposer`] so the preview follows every edit.

pub mod config;
pub mod services;

use tracing_subscriber::EnvFilter;

pub use config::{AppConfig, ConfigError};
pub use services::{MergeSession, Notice, Recomposer};

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG`; defaults to `info`. Call once at startup.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Load configuration, failing fast on any invalid setting.
pub fn init_config() -> Result<AppConfig, anyhow::Error> {
    load_dotenv();
    let config = AppConfig::from_env()?;
    tracing::info!(
        axis = ?config.axis,
        scaling = ?config.scaling_policy,
        format = %config.export_format,
        "Configuration loaded"
    );
    Ok(config)
}

/// Create a session and start its recompose worker.
///
/// Must be called from within a tokio runtime.
pub fn start_session(config: &AppConfig) -> (MergeSession, Recomposer) {
    let session = MergeSession::new(config);
    let recomposer = Recomposer::spawn(session.subscribe(), config.debounce);
    (session, recomposer)
}
