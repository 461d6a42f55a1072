//! Runs the provider middleware inside the router's middleware chain.
//!
//! The provider middleware wraps a plain request handler. The adapter drives it
//! against a detached copy of the incoming request (same method, URI, and
//! headers, empty body) with a no-op probe as the wrapped handler. Claims the
//! middleware attaches land on that copy, so the routed request never sees
//! them unless [`AdapterMode::Propagate`] carries them across.

use std::convert::Infallible;

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower::{service_fn, Layer, ServiceExt};
use tracing::info;

use super::SessionLayer;
use crate::config::AdapterMode;
use crate::provider::SessionClaims;
use crate::server::state::AppState;

/// Middleware for routes that expect provider claims in their request.
pub async fn run(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let provider_middleware = SessionLayer::required(state.verifier.clone()).layer(service_fn(probe));
    let outcome = match provider_middleware.oneshot(detached_copy(&req)).await {
        Ok(resp) => resp,
        Err(never) => match never {},
    };

    info!(
        adapter = ?state.adapter,
        status = outcome.status().as_u16(),
        found = req.extensions().get::<SessionClaims>().is_some(),
        "session visibility in router middleware"
    );

    match state.adapter {
        // Outcome discarded: rejections fall through to the handler's 500.
        AdapterMode::WrapHandler => {}
        AdapterMode::Manual => {
            if outcome.status() != StatusCode::OK {
                return outcome;
            }
        }
        AdapterMode::Propagate => {
            if outcome.status() != StatusCode::OK {
                return outcome;
            }
            if let Some(claims) = outcome.extensions().get::<SessionClaims>() {
                req.extensions_mut().insert(claims.clone());
            }
        }
    }
    next.run(req).await
}

/// Handler wrapped by the provider middleware. Reports what it observed by
/// returning any claims in the response extensions.
async fn probe(req: Request) -> Result<Response, Infallible> {
    let claims = req.extensions().get::<SessionClaims>().cloned();
    info!(found = claims.is_some(), "session visibility in provider middleware");

    let mut resp = StatusCode::OK.into_response();
    if let Some(claims) = claims {
        resp.extensions_mut().insert(claims);
    }
    Ok(resp)
}

fn detached_copy(req: &Request) -> Request {
    let mut copy = Request::new(Body::empty());
    *copy.method_mut() = req.method().clone();
    *copy.uri_mut() = req.uri().clone();
    *copy.version_mut() = req.version();
    *copy.headers_mut() = req.headers().clone();
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::AUTHORIZATION, Method};

    #[test]
    fn detached_copy_keeps_routing_data_but_not_extensions() {
        let mut req = Request::builder()
            .method(Method::GET)
            .uri("/user-with-middleware?x=1")
            .header(AUTHORIZATION, "Bearer tok")
            .body(Body::from("payload"))
            .unwrap();
        req.extensions_mut().insert(42u8);

        let copy = detached_copy(&req);
        assert_eq!(copy.method(), Method::GET);
        assert_eq!(copy.uri(), "/user-with-middleware?x=1");
        assert_eq!(copy.headers()[AUTHORIZATION], "Bearer tok");
        assert!(copy.extensions().get::<u8>().is_none());
    }

    #[tokio::test]
    async fn probe_reports_claims_through_response() {
        let mut req = Request::new(Body::empty());
        req.extensions_mut()
            .insert(crate::server::test_support::claims());
        let resp = probe(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.extensions().get::<SessionClaims>().is_some());
    }
}
