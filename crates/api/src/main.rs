//! `session-demo` — binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise tracing (plus OTLP export when configured).
//! 3. Construct the provider client; failure here is fatal.
//! 4. Build the Axum router and serve until the process is killed.

mod config;
mod provider;
mod server;
mod session;
mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use config::Config;
use provider::{ClerkClient, VerifyOptions};
use server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.listen_port,
        adapter = ?cfg.session_adapter,
        "session-demo starting"
    );

    // -----------------------------------------------------------------------
    // 3. Provider client
    // -----------------------------------------------------------------------
    let clerk = ClerkClient::new(cfg.clerk_development_secret_key.clone(), cfg.clerk_api_url.clone())
        .context("failed to construct auth provider client")?
        .with_jwks_ttl(Duration::from_secs(cfg.jwks_cache_ttl_secs));
    let options = VerifyOptions::with_leeway(Duration::from_secs(cfg.token_leeway_secs));

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(Arc::new(clerk), options, cfg.session_adapter);
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    // No graceful shutdown: the process runs until it is killed.
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
