//! In-memory cache of the provider's token signing keys, keyed by `kid`.
//!
//! The cache uses `arc-swap` for lock-free reads on the verification path;
//! a refresh swaps in a complete new key set together with its fetch time.
//! A set is fresh for the configured TTL; a `kid` missing from a fresh set is
//! unknown, not a reason to refetch.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use arc_swap::ArcSwap;
use jsonwebtoken::{jwk::JwkSet, DecodingKey};
use tracing::warn;

/// Default lifetime of a fetched key set.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Keys from one JWKS fetch. `fetched_at` is `None` until the first fetch.
struct KeySet {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Option<Instant>,
}

/// Shared, lock-free cache of decoding keys.
#[derive(Clone)]
pub struct JwksCache {
    inner: Arc<ArcSwap<KeySet>>,
    ttl: Duration,
}

impl JwksCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(ArcSwap::new(Arc::new(KeySet {
                keys: HashMap::new(),
                fetched_at: None,
            }))),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.load().keys.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.inner.load().keys.is_empty()
    }

    /// `true` when a key set was fetched less than one TTL ago.
    pub fn is_fresh(&self) -> bool {
        self.inner
            .load()
            .fetched_at
            .is_some_and(|at| at.elapsed() < self.ttl)
    }

    /// Look up the decoding key for `kid`.
    pub fn get(&self, kid: &str) -> Option<DecodingKey> {
        self.inner.load().keys.get(kid).cloned()
    }

    /// Atomically replace all cached keys with the contents of `set` and
    /// restart the TTL.
    ///
    /// Keys without a `kid`, or that cannot be turned into a decoding key,
    /// are skipped.
    pub fn replace_all(&self, set: &JwkSet) {
        let keys: HashMap<String, DecodingKey> = set
            .keys
            .iter()
            .filter_map(|jwk| {
                let kid = jwk.common.key_id.clone()?;
                match DecodingKey::from_jwk(jwk) {
                    Ok(key) => Some((kid, key)),
                    Err(e) => {
                        warn!(kid = %kid, error = %e, "skipping unusable signing key");
                        None
                    }
                }
            })
            .collect();
        self.inner.store(Arc::new(KeySet {
            keys,
            fetched_at: Some(Instant::now()),
        }));
    }
}

impl Default for JwksCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl std::fmt::Debug for JwksCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksCache")
            .field("keys", &self.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JWKS: &str = include_str!("testdata/jwks.json");

    fn jwks() -> JwkSet {
        serde_json::from_str(JWKS).unwrap()
    }

    #[test]
    fn initially_empty_and_stale() {
        let cache = JwksCache::default();
        assert!(cache.is_empty());
        assert!(!cache.is_fresh());
        assert!(cache.get("ins_test_key").is_none());
    }

    #[test]
    fn replace_all_and_get() {
        let cache = JwksCache::default();
        cache.replace_all(&jwks());
        assert_eq!(cache.len(), 1);
        assert!(cache.is_fresh());
        assert!(cache.get("ins_test_key").is_some());
        assert!(cache.get("other").is_none());
    }

    #[test]
    fn zero_ttl_is_never_fresh() {
        let cache = JwksCache::new(Duration::ZERO);
        cache.replace_all(&jwks());
        assert!(!cache.is_fresh());
        assert!(cache.get("ins_test_key").is_some());
    }

    #[test]
    fn empty_fetch_still_counts_as_fresh() {
        let cache = JwksCache::default();
        cache.replace_all(&JwkSet { keys: Vec::new() });
        assert!(cache.is_fresh());
        assert!(cache.is_empty());
    }

    #[test]
    fn replace_all_drops_keys_without_kid() {
        let cache = JwksCache::default();
        let mut set = jwks();
        set.keys[0].common.key_id = None;
        cache.replace_all(&set);
        assert!(cache.is_empty());
    }

    #[test]
    fn replace_all_is_atomic() {
        let cache = JwksCache::default();
        cache.replace_all(&jwks());
        cache.replace_all(&JwkSet { keys: Vec::new() });
        assert!(cache.get("ins_test_key").is_none());
    }
}
