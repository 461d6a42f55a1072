//! [`ClerkClient`]: HTTPS client for the provider's backend API.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{issuer_is_trusted, JwksCache, ProviderError, SessionClaims, SessionProvider, User, VerifyOptions};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Provider client holding the secret key, an HTTP connection pool, and the
/// signing-key cache.
///
/// Cloning is cheap; all clones share the pool and the cache.
#[derive(Clone)]
pub struct ClerkClient {
    http: reqwest::Client,
    api_url: String,
    secret_key: String,
    jwks: JwksCache,
    // At most one JWKS fetch in flight; waiters re-check freshness.
    refresh_lock: Arc<Mutex<()>>,
}

impl ClerkClient {
    /// Build a client for the API at `api_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::MissingSecretKey`] if `secret_key` is blank, or
    /// [`ProviderError::Http`] if the HTTP client cannot be built.
    pub fn new(
        secret_key: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let secret_key = secret_key.into();
        if secret_key.trim().is_empty() {
            return Err(ProviderError::MissingSecretKey);
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("session-demo/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_owned(),
            secret_key,
            jwks: JwksCache::default(),
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Keep a fetched key set for `ttl` before fetching it again.
    pub fn with_jwks_ttl(mut self, ttl: Duration) -> Self {
        self.jwks = JwksCache::new(ttl);
        self
    }

    /// Fetch the signing keys and replace the cache.
    async fn refresh_jwks(&self) -> Result<(), ProviderError> {
        let resp = self
            .http
            .get(format!("{}/jwks", self.api_url))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        let set: JwkSet = resp.json().await?;

        self.jwks.replace_all(&set);
        info!(count = self.jwks.len(), "signing keys refreshed");
        Ok(())
    }

    /// Resolve the key for `kid`.
    ///
    /// The key set is fetched only when it has never been fetched or its TTL
    /// has run out. A `kid` absent from a fresh set is rejected without
    /// another fetch.
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, ProviderError> {
        if !self.jwks.is_fresh() {
            let _guard = self.refresh_lock.lock().await;
            if !self.jwks.is_fresh() {
                debug!(kid = %kid, "signing keys stale; refreshing");
                self.refresh_jwks().await?;
            }
        }
        self.jwks
            .get(kid)
            .ok_or_else(|| ProviderError::UnknownKey(kid.to_owned()))
    }
}

#[async_trait]
impl SessionProvider for ClerkClient {
    async fn verify_token(
        &self,
        token: &str,
        options: &VerifyOptions,
    ) -> Result<SessionClaims, ProviderError> {
        let header = decode_header(token)?;
        let kid = header.kid.ok_or(ProviderError::MissingKeyId)?;
        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = options.leeway.as_secs();
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let claims = decode::<SessionClaims>(token, &key, &validation)?.claims;
        if !issuer_is_trusted(&claims.issuer) {
            return Err(ProviderError::InvalidIssuer(claims.issuer));
        }
        Ok(claims)
    }

    async fn read_user(&self, user_id: &str) -> Result<User, ProviderError> {
        let resp = self
            .http
            .get(format!("{}/users/{user_id}", self.api_url))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.json().await?)
    }
}

impl std::fmt::Debug for ClerkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClerkClient")
            .field("api_url", &self.api_url)
            .field("secret_key", &"[REDACTED]")
            .field("jwks", &self.jwks)
            .finish()
    }
}

async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ProviderError::Api {
        status: status.as_u16(),
        body,
    })
}
