//! Base trait for generative model clients

use async_trait::async_trait;
use quickie_core::session::Turn;
use thiserror::Error;

/// Error type for provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// A text generation backend.
///
/// Implementations hold no conversation state: every call carries the full
/// prior history, so one client can serve any number of sessions at once.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate the assistant reply to `prompt` following `history`
    async fn generate(&self, history: &[Turn], prompt: &str) -> ProviderResult<String>;

    /// Model identifier used for requests
    fn model_name(&self) -> &str;
}
