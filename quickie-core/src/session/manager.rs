//! Per-session history persistence on top of a [`CacheStore`]

use super::store::History;
use crate::cache::CacheStore;
use crate::config::SessionConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Loads and saves session histories in the cache
#[derive(Clone)]
pub struct SessionManager {
    cache: Arc<dyn CacheStore>,
    key_prefix: String,
    ttl: Duration,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(cache: Arc<dyn CacheStore>, key_prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            cache,
            key_prefix: key_prefix.into(),
            ttl,
        }
    }

    /// Create a session manager from the session settings
    pub fn from_config(
        cache: Arc<dyn CacheStore>,
        key_prefix: impl Into<String>,
        config: &SessionConfig,
    ) -> Self {
        Self::new(cache, key_prefix, Duration::from_secs(config.ttl_secs))
    }

    /// Load the stored history of a session.
    ///
    /// Returns `Ok(None)` when the entry is missing or cannot be parsed;
    /// cache failures are returned as errors.
    pub async fn load(&self, token: &str) -> crate::Result<Option<History>> {
        let key = self.key(token);
        let Some(raw) = self.cache.get(&key).await? else {
            debug!(key = %key, "No stored history");
            return Ok(None);
        };

        match History::decode(&raw) {
            Ok(history) => Ok(Some(history)),
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding malformed stored history");
                Ok(None)
            }
        }
    }

    /// Write the full history and restart its expiry window
    pub async fn save(&self, token: &str, history: &History) -> crate::Result<()> {
        let key = self.key(token);
        let value = history.encode()?;
        self.cache.set_with_ttl(&key, &value, self.ttl).await?;
        debug!(key = %key, turns = history.len(), "Saved history");
        Ok(())
    }

    /// Cache key of a session
    pub fn key(&self, token: &str) -> String {
        format!("{}{}", self.key_prefix, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    fn manager(cache: Arc<MemoryCache>) -> SessionManager {
        SessionManager::new(cache, "chat:", Duration::from_secs(86_400))
    }

    #[tokio::test]
    async fn test_load_missing_returns_none() {
        let sessions = manager(Arc::new(MemoryCache::new()));
        assert!(sessions.load("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let cache = Arc::new(MemoryCache::new());
        let sessions = manager(cache.clone());

        let mut history = History::new();
        history.push_exchange("Hi", "Hello");
        sessions.save("abc", &history).await.unwrap();

        assert!(cache.contains("chat:abc"));
        let loaded = sessions.load("abc").await.unwrap().unwrap();
        assert_eq!(loaded, history);
    }

    #[tokio::test]
    async fn test_malformed_value_is_treated_as_absent() {
        let cache = Arc::new(MemoryCache::new());
        cache
            .set_with_ttl("chat:abc", "not json", Duration::from_secs(60))
            .await
            .unwrap();

        let sessions = manager(cache);
        assert!(sessions.load("abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_refreshes_ttl() {
        let cache = Arc::new(MemoryCache::new());
        cache
            .set_with_ttl("chat:abc", "[]", Duration::from_secs(5))
            .await
            .unwrap();

        let sessions = manager(cache.clone());
        sessions.save("abc", &History::new()).await.unwrap();

        let remaining = cache.ttl("chat:abc").unwrap();
        assert!(remaining > Duration::from_secs(86_000));
    }
}
