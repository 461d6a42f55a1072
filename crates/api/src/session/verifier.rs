//! [`SessionVerifier`]: provider handle bundled with verification options.

use std::sync::Arc;

use axum::http::HeaderMap;

use super::token;
use crate::provider::{ProviderError, SessionClaims, SessionProvider, VerifyOptions};

/// Cheaply cloneable verifier shared by handlers and middleware.
#[derive(Clone)]
pub struct SessionVerifier {
    provider: Arc<dyn SessionProvider>,
    options: VerifyOptions,
}

impl SessionVerifier {
    pub fn new(provider: Arc<dyn SessionProvider>, options: VerifyOptions) -> Self {
        Self { provider, options }
    }

    pub fn provider(&self) -> &dyn SessionProvider {
        self.provider.as_ref()
    }

    /// Verify `token` with the configured options.
    pub async fn verify(&self, token: &str) -> Result<SessionClaims, ProviderError> {
        self.provider.verify_token(token, &self.options).await
    }

    /// Verify whatever session token `headers` carry.
    ///
    /// Returns `Ok(None)` when the request has no token at all.
    ///
    /// # Errors
    ///
    /// Returns the provider error when a token is present but invalid.
    pub async fn authenticate(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<SessionClaims>, ProviderError> {
        match token::session_token(headers) {
            Some(token) => self.verify(token).await.map(Some),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for SessionVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionVerifier")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::test_support::{claims, provider, GOOD_TOKEN};
    use axum::http::{header::AUTHORIZATION, HeaderValue};

    #[tokio::test]
    async fn no_token_is_not_an_error() {
        let verifier = SessionVerifier::new(provider(0, None), VerifyOptions::default());
        let found = verifier.authenticate(&HeaderMap::new()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn valid_token_yields_claims() {
        let verifier = SessionVerifier::new(provider(1, None), VerifyOptions::default());
        let mut headers = HeaderMap::new();
        let value = format!("Bearer {GOOD_TOKEN}");
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
        let found = verifier.authenticate(&headers).await.unwrap();
        assert_eq!(found, Some(claims()));
    }

    #[tokio::test]
    async fn invalid_token_is_an_error() {
        let verifier = SessionVerifier::new(provider(1, None), VerifyOptions::default());
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer forged"));
        assert!(verifier.authenticate(&headers).await.is_err());
    }
}
