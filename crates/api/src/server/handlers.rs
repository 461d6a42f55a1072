//! Axum request handlers for all service endpoints.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use common::{
    protocol::{ErrorResponse, UserResponse},
    ServiceError,
};
use tracing::{info, warn};

use super::{error::ApiError, state::AppState};
use crate::provider::SessionClaims;
use crate::session::token;

/// `GET /livez` — the process is up and serving.
pub async fn livez() -> &'static str {
    "ok"
}

/// `GET /user` — verify the bearer token in the handler itself, then fetch
/// the user named by its subject.
pub async fn user_from_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let token = token::bearer_token(&headers).ok_or(ServiceError::Unauthorized)?;
    let claims = state.verifier.verify(token).await.map_err(|e| {
        warn!(error = %e, "bearer token rejected");
        ServiceError::Unauthorized
    })?;
    lookup_user(&state, &claims).await
}

/// `GET /user-with-middleware` — rely on session middleware to have put the
/// claims into the request, then fetch the user.
pub async fn user_from_context(
    State(state): State<AppState>,
    claims: Option<Extension<SessionClaims>>,
) -> Result<Json<UserResponse>, ApiError> {
    let Some(Extension(claims)) = claims else {
        warn!("no session claims on the routed request");
        return Err(ServiceError::SessionNotFound.into());
    };
    lookup_user(&state, &claims).await
}

/// `GET /user2` — report whether the session layer populated the request.
/// Always answers `200` with an empty body.
pub async fn session_probe(claims: Option<Extension<SessionClaims>>) -> StatusCode {
    match claims {
        Some(Extension(claims)) => info!(
            found = true,
            subject = %claims.subject,
            session_id = ?claims.session_id,
            "session lookup in handler"
        ),
        None => info!(found = false, "session lookup in handler"),
    }
    StatusCode::OK
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

async fn lookup_user(
    state: &AppState,
    claims: &SessionClaims,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .verifier
        .provider()
        .read_user(&claims.subject)
        .await
        .map_err(|e| {
            warn!(subject = %claims.subject, error = %e, "user lookup failed");
            ServiceError::UserLookup(e.to_string())
        })?;

    Ok(Json(UserResponse {
        first_name: user.first_name,
        last_name: user.last_name,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    use crate::config::AdapterMode;
    use crate::provider::VerifyOptions;
    use crate::server::test_support::{claims, provider, Lookup};

    fn context_router(state: AppState, with_claims: bool) -> Router {
        let router = Router::new().route("/", get(user_from_context));
        let router = if with_claims {
            router.layer(Extension(claims()))
        } else {
            router
        };
        router.with_state(state)
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_root() -> Request<Body> {
        Request::builder().uri("/").body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn livez_says_ok() {
        assert_eq!(livez().await, "ok");
    }

    #[tokio::test]
    async fn context_handler_uses_claims_from_extensions() {
        let state = AppState::new(
            provider(0, Some(Lookup::Found)),
            VerifyOptions::default(),
            AdapterMode::Manual,
        );
        let resp = context_router(state, true).oneshot(get_root()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            serde_json::json!({"firstName": "Ada", "lastName": "Lovelace"})
        );
    }

    #[tokio::test]
    async fn context_handler_without_claims_is_500() {
        let state = AppState::new(provider(0, None), VerifyOptions::default(), AdapterMode::Manual);
        let resp = context_router(state, false).oneshot(get_root()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(resp).await["message"],
            "failed to retrieve session from context"
        );
    }

    #[tokio::test]
    async fn context_handler_lookup_failure_is_500() {
        let state = AppState::new(
            provider(0, Some(Lookup::Fails)),
            VerifyOptions::default(),
            AdapterMode::Manual,
        );
        let resp = context_router(state, true).oneshot(get_root()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await["message"], "failed to read user from claims");
    }

    #[tokio::test]
    async fn session_probe_is_always_ok() {
        assert_eq!(session_probe(None).await, StatusCode::OK);
        assert_eq!(session_probe(Some(Extension(claims()))).await, StatusCode::OK);
    }
}
