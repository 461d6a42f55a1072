//! Axum router construction.
//!
//! Three route groups share one router:
//! - no session middleware: `/livez`, `/user`
//! - provider middleware through the adapter: `/user-with-middleware`
//! - provider middleware as a native layer: `/user2`

use std::time::Duration;

use axum::{middleware::from_fn_with_state, routing::get, Router};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, state::AppState};
use crate::session::{adapter, SessionLayer};

/// Requests still running after this are answered with `408`.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the application [`Router`] with all routes and middleware attached.
pub fn build(state: AppState) -> Router {
    let adapted = Router::new()
        .route("/user-with-middleware", get(handlers::user_from_context))
        .route_layer(from_fn_with_state(state.clone(), adapter::run));

    let layered = Router::new()
        .route("/user2", get(handlers::session_probe))
        .route_layer(SessionLayer::optional(state.verifier.clone()));

    Router::new()
        .route("/livez", get(handlers::livez))
        .route("/user", get(handlers::user_from_token))
        .merge(adapted)
        .merge(layered)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .with_state(state)
}
