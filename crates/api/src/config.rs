//! Configuration loading and validation for the session demo service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any variable is present but invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

/// How `/user-with-middleware` runs the provider middleware in front of its handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterMode {
    /// Run the provider middleware as a standalone handler and always continue.
    ///
    /// This mode drops the middleware's outcome, so a missing or invalid token
    /// reaches the handler and ends in its 500 instead of the 401/403 the
    /// middleware wrote.
    WrapHandler,
    /// Run the provider middleware, stop on a non-200 outcome, otherwise continue.
    #[default]
    Manual,
    /// As `Manual`, but copy the observed claims onto the routed request.
    Propagate,
}

/// Validated service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Provider secret key. Left empty here so that the provider client, not
    /// the config loader, reports the missing key.
    #[serde(default)]
    pub clerk_development_secret_key: String,

    /// Base URL of the provider's backend API.
    #[serde(default = "default_clerk_api_url")]
    pub clerk_api_url: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Clock-skew tolerance (seconds) applied when validating token times.
    #[serde(default = "default_token_leeway")]
    pub token_leeway_secs: u64,

    /// How long (seconds) a fetched signing-key set is trusted before the
    /// next fetch.
    #[serde(default = "default_jwks_cache_ttl")]
    pub jwks_cache_ttl_secs: u64,

    /// Wiring used for `/user-with-middleware`.
    #[serde(default)]
    pub session_adapter: AdapterMode,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional OTLP endpoint; spans are only exported when set.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,
}

fn default_clerk_api_url() -> String {
    "https://api.clerk.com/v1".into()
}
fn default_listen_port() -> u16 {
    4242
}
// 50 000 minutes, so locally minted test tokens stay valid.
fn default_token_leeway() -> u64 {
    50_000 * 60
}
fn default_jwks_cache_ttl() -> u64 {
    3600
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        let url = self.clerk_api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("CLERK_API_URL must be an http(s) URL");
        }
        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be > 0");
        }
        if self.jwks_cache_ttl_secs == 0 {
            anyhow::bail!("JWKS_CACHE_TTL_SECS must be > 0");
        }
        if self.log_level.trim().is_empty() {
            anyhow::bail!("LOG_LEVEL must not be empty");
        }
        Ok(())
    }
}
