//! Chat orchestration: history load, model call, history save

use quickie_core::session::{History, SessionManager};
use quickie_providers::ChatModel;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::locks::SessionLocks;

/// Outcome of a successful send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    pub session_id: String,
}

/// Runs the two chat operations against the history cache and the model
pub struct ChatService {
    sessions: SessionManager,
    model: Arc<dyn ChatModel>,
    locks: SessionLocks,
}

impl ChatService {
    pub fn new(sessions: SessionManager, model: Arc<dyn ChatModel>) -> Self {
        Self {
            sessions,
            model,
            locks: SessionLocks::new(),
        }
    }

    /// Send `prompt` in session `token` and persist the exchange.
    ///
    /// The history is written only after the model answered, as one value
    /// holding the new user/assistant pair, with its expiry restarted.
    pub async fn send_message(&self, token: &str, prompt: &str) -> Result<ChatReply, ApiError> {
        if prompt.trim().is_empty() {
            return Err(ApiError::BadRequest("prompt must not be empty".to_string()));
        }

        let _guard = self.locks.acquire(token).await;

        let mut history = self.sessions.load(token).await?.unwrap_or_default();
        debug!(
            session_id = %token,
            turns = history.len(),
            model = self.model.model_name(),
            "Generating reply"
        );

        let response = self.model.generate(history.turns(), prompt).await?;

        history.push_exchange(prompt, response.as_str());
        self.sessions.save(token, &history).await?;
        info!(session_id = %token, turns = history.len(), "Chat turn stored");

        Ok(ChatReply {
            response,
            session_id: token.to_string(),
        })
    }

    /// Stored history of a session, `None` when there is none
    pub async fn fetch_history(&self, token: Option<&str>) -> Result<Option<History>, ApiError> {
        let Some(token) = token else {
            return Ok(None);
        };
        Ok(self.sessions.load(token).await?)
    }
}
