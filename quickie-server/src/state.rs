use quickie_core::cache::CacheStore;
use quickie_core::config::Config;
use quickie_core::session::{SessionManager, Turn};
use quickie_providers::ChatModel;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::chat::ChatService;
use crate::session::SessionResolver;

/// Shared handler state; cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub chat: Arc<ChatService>,
    pub resolver: Arc<SessionResolver>,
}

impl AppState {
    pub fn new(config: Config, cache: Arc<dyn CacheStore>, model: Arc<dyn ChatModel>) -> Self {
        let sessions =
            SessionManager::from_config(cache, config.cache.key_prefix.clone(), &config.session);
        Self {
            resolver: Arc::new(SessionResolver::from_config(&config.session)),
            chat: Arc::new(ChatService::new(sessions, model)),
            config: Arc::new(config),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
}

pub const NO_HISTORY_MESSAGE: &str = "No chat history found.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryResponse {
    Found { history: Vec<Turn> },
    Empty { message: String },
}

impl HistoryResponse {
    pub fn empty() -> Self {
        HistoryResponse::Empty {
            message: NO_HISTORY_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}
