//! Provider session middleware as a tower [`Layer`].
//!
//! On success the verified [`SessionClaims`](crate::provider::SessionClaims)
//! are inserted into the request extensions before the inner service runs.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};
use common::ServiceError;
use tower::{Layer, Service};
use tracing::{debug, warn};

use super::SessionVerifier;
use crate::server::error::ApiError;

/// What to do with requests that carry no session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPolicy {
    /// Let them through without claims.
    Optional,
    /// Reject them with `403 Forbidden`.
    Required,
}

/// Layer that verifies the request's session token.
///
/// Invalid tokens are rejected with `401 Unauthorized` under either policy.
#[derive(Clone, Debug)]
pub struct SessionLayer {
    verifier: SessionVerifier,
    policy: SessionPolicy,
}

impl SessionLayer {
    pub fn optional(verifier: SessionVerifier) -> Self {
        Self {
            verifier,
            policy: SessionPolicy::Optional,
        }
    }

    pub fn required(verifier: SessionVerifier) -> Self {
        Self {
            verifier,
            policy: SessionPolicy::Required,
        }
    }
}

impl<S> Layer<S> for SessionLayer {
    type Service = SessionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionService {
            inner,
            verifier: self.verifier.clone(),
            policy: self.policy,
        }
    }
}

/// Service produced by [`SessionLayer`].
#[derive(Clone, Debug)]
pub struct SessionService<S> {
    inner: S,
    verifier: SessionVerifier,
    policy: SessionPolicy,
}

impl<S> Service<Request> for SessionService<S>
where
    S: Service<Request> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Error: Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        // Keep the instance that was driven to readiness.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let verifier = self.verifier.clone();
        let policy = self.policy;

        Box::pin(async move {
            let verified = verifier.authenticate(req.headers()).await;
            match verified {
                Ok(Some(claims)) => {
                    debug!(subject = %claims.subject, "session verified");
                    req.extensions_mut().insert(claims);
                }
                Ok(None) if policy == SessionPolicy::Required => {
                    return Ok(ApiError::from(ServiceError::Forbidden).into_response());
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "session verification failed");
                    return Ok(ApiError::from(ServiceError::Unauthorized).into_response());
                }
            }
            inner.call(req).await.map(IntoResponse::into_response)
        })
    }
}
