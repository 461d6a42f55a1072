//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::Unauthorized`] → 401
/// - [`ServiceError::Forbidden`] → 403
/// - [`ServiceError::SessionNotFound`] → 500
/// - [`ServiceError::UserLookup`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The bearer token is missing or failed verification.
    #[error("unauthorized")]
    Unauthorized,

    /// A route that requires a session was reached without one.
    #[error("forbidden: no active session")]
    Forbidden,

    /// The handler expected session claims in the request but found none.
    #[error("session claims not found in request")]
    SessionNotFound,

    /// The provider could not return the user named by the session subject.
    #[error("user lookup failed: {0}")]
    UserLookup(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::Unauthorized => 401,
            ServiceError::Forbidden => 403,
            ServiceError::SessionNotFound => 500,
            ServiceError::UserLookup(_) => 500,
        }
    }

    /// Fixed message exposed to callers. Never includes the internal cause.
    pub fn public_message(&self) -> &'static str {
        match self {
            ServiceError::Unauthorized => "Unauthorized",
            ServiceError::Forbidden => "Forbidden",
            ServiceError::SessionNotFound => "failed to retrieve session from context",
            ServiceError::UserLookup(_) => "failed to read user from claims",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(ServiceError::Unauthorized.http_status(), 401);
        assert_eq!(ServiceError::Forbidden.http_status(), 403);
        assert_eq!(ServiceError::SessionNotFound.http_status(), 500);
        assert_eq!(ServiceError::UserLookup("x".into()).http_status(), 500);
    }

    #[test]
    fn public_message_hides_cause() {
        let e = ServiceError::UserLookup("404 user_not_found".into());
        assert_eq!(e.public_message(), "failed to read user from claims");
        assert!(e.to_string().contains("user_not_found"));
    }
}
