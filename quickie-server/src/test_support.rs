//! Test doubles for the cache and the model

use async_trait::async_trait;
use parking_lot::Mutex;
use quickie_core::cache::CacheStore;
use quickie_core::session::Turn;
use quickie_providers::{ChatModel, ProviderError, ProviderResult};
use std::net::SocketAddr;
use std::time::Duration;

/// Replies `echo: <prompt>` and records the history length of each call
#[derive(Default)]
pub struct EchoModel {
    delay: Option<Duration>,
    calls: Mutex<Vec<usize>>,
}

impl EchoModel {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn seen_history_lens(&self) -> Vec<usize> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ChatModel for EchoModel {
    async fn generate(&self, history: &[Turn], prompt: &str) -> ProviderResult<String> {
        self.calls.lock().push(history.len());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(format!("echo: {}", prompt))
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

pub struct FailingModel;

#[async_trait]
impl ChatModel for FailingModel {
    async fn generate(&self, _history: &[Turn], _prompt: &str) -> ProviderResult<String> {
        Err(ProviderError::ApiError(
            "HTTP 429 Too Many Requests: RESOURCE_EXHAUSTED: Quota exceeded".to_string(),
        ))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

/// Behaves like an unreachable cache server
pub struct FailingCache;

#[async_trait]
impl CacheStore for FailingCache {
    async fn get(&self, _key: &str) -> quickie_core::Result<Option<String>> {
        Err(quickie_core::Error::Cache(
            "Connection refused (os error 111)".to_string(),
        ))
    }

    async fn set_with_ttl(
        &self,
        _key: &str,
        _value: &str,
        _ttl: Duration,
    ) -> quickie_core::Result<()> {
        Err(quickie_core::Error::Cache(
            "Connection refused (os error 111)".to_string(),
        ))
    }
}

/// Address of a listener that accepts connections and never answers
pub async fn silent_endpoint() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    addr
}
