use anyhow::{bail, Result};
use quickie_server::state::{ChatRequest, ChatResponse, HistoryResponse};
use reqwest::{Client, Response};
use serde::Deserialize;

/// Minimal client for a running quickie server
pub struct ApiClient {
    client: Client,
    base_url: String,
    session_header: String,
}

#[derive(Deserialize)]
struct ErrorReply {
    detail: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session_header: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_header: session_header.into(),
        }
    }

    pub async fn chat(&self, prompt: &str, session: Option<&str>) -> Result<ChatResponse> {
        let mut request = self
            .client
            .post(format!("{}/chat", self.base_url))
            .json(&ChatRequest {
                prompt: prompt.to_string(),
            });
        if let Some(token) = session {
            request = request.header(self.session_header.as_str(), token);
        }

        let response = check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn history(&self, session: &str) -> Result<HistoryResponse> {
        let response = self
            .client
            .get(format!("{}/chat/history", self.base_url))
            .header(self.session_header.as_str(), session)
            .send()
            .await?;

        let response = check(response).await?;
        Ok(response.json().await?)
    }
}

async fn check(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorReply>(&body)
        .map(|e| e.detail)
        .unwrap_or(body);
    bail!("server returned {}: {}", status, detail)
}
