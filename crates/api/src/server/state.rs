//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::AdapterMode;
use crate::provider::{SessionProvider, VerifyOptions};
use crate::session::SessionVerifier;

/// Application state shared across all request handlers.
///
/// Cloning is cheap: the provider sits behind an `Arc`.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Provider handle plus the options every verification uses.
    pub verifier: SessionVerifier,
    /// Wiring used for `/user-with-middleware`.
    pub adapter: AdapterMode,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn SessionProvider>,
        options: VerifyOptions,
        adapter: AdapterMode,
    ) -> Self {
        Self {
            verifier: SessionVerifier::new(provider, options),
            adapter,
        }
    }
}
