//! Hosted authentication provider: session token verification and user lookup.
//!
//! Handlers and middleware only see the [`SessionProvider`] trait. The
//! production implementation is [`ClerkClient`], which talks to the
//! provider's backend API over HTTPS.
//!
//! # Module invariants
//!
//! - The secret key and raw session tokens are never logged.
//! - Claims are only produced after signature and time validation succeed.

pub mod client;
pub mod jwks;

pub use client::ClerkClient;
pub use jwks::JwksCache;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while talking to the provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The client was constructed without a secret key.
    #[error("provider secret key is required")]
    MissingSecretKey,

    /// The token header carries no `kid`.
    #[error("session token has no key id")]
    MissingKeyId,

    /// No JWKS entry matches the token's `kid`, even after a refresh.
    #[error("no signing key found for kid {0}")]
    UnknownKey(String),

    /// The token was issued by someone other than the provider.
    #[error("untrusted token issuer: {0}")]
    InvalidIssuer(String),

    /// Decoding, signature, or time validation failed.
    #[error("invalid session token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Transport-level failure reaching the provider API.
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider API answered with a non-success status.
    #[error("provider API returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// Authenticated session payload issued by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(rename = "sub")]
    pub subject: String,
    #[serde(rename = "sid", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(rename = "iss")]
    pub issuer: String,
    #[serde(rename = "azp", default, skip_serializing_if = "Option::is_none")]
    pub authorized_party: Option<String>,
    #[serde(rename = "exp")]
    pub expires_at: u64,
    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<u64>,
    #[serde(rename = "nbf", default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<u64>,
}

/// A user record as returned by the provider API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Options applied to a single token verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Tolerance applied to `exp` and `nbf`.
    pub leeway: Duration,
}

impl VerifyOptions {
    pub fn with_leeway(leeway: Duration) -> Self {
        Self { leeway }
    }
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self::with_leeway(Duration::ZERO)
    }
}

/// Operations the service needs from the authentication provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Verify a session token and return its claims.
    async fn verify_token(
        &self,
        token: &str,
        options: &VerifyOptions,
    ) -> Result<SessionClaims, ProviderError>;

    /// Fetch the user identified by `user_id` (a session subject).
    async fn read_user(&self, user_id: &str) -> Result<User, ProviderError>;
}

/// Returns `true` for issuers that belong to the provider's frontend API.
pub(crate) fn issuer_is_trusted(issuer: &str) -> bool {
    issuer.starts_with("https://clerk.") || issuer.contains(".clerk.accounts")
}
