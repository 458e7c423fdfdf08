//! `vault` binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Build the [`EnvelopeCipher`] from the master key and rotation threshold.
//! 4. Build the Axum router over an empty [`RecordStore`] and start serving.

mod config;
mod server;
mod store;
mod telemetry;

use anyhow::{Context, Result};
use fieldcrypt::EnvelopeCipher;
use tracing::info;

use config::Config;
use server::state::AppState;
use store::RecordStore;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        "vault starting"
    );

    // -----------------------------------------------------------------------
    // 3. Envelope cipher
    // -----------------------------------------------------------------------
    let cipher = EnvelopeCipher::new(cfg.envelope_config()?);
    info!(
        rotation_threshold = cipher.rotation_threshold(),
        "envelope cipher ready"
    );

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(RecordStore::new(), cipher, cfg.principal_header.clone());
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    axum::serve(listener, router).await?;

    Ok(())
}
