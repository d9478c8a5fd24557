//! Gemini REST client

use async_trait::async_trait;
use quickie_core::config::{ModelConfig, DEFAULT_GEMINI_API_BASE};
use quickie_core::session::{Role, Turn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::base::{ChatModel, ProviderError, ProviderResult};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// `generateContent` request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Client for the Gemini `generateContent` endpoint
pub struct GeminiClient {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    system_instruction: Option<String>,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
}

impl GeminiClient {
    /// Create a client with the default endpoint and request timeout
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> ProviderResult<Self> {
        Self::build(
            api_key.into(),
            DEFAULT_GEMINI_API_BASE.to_string(),
            model.into(),
            DEFAULT_TIMEOUT,
        )
    }

    /// Create a client from the model settings
    pub fn from_config(config: &ModelConfig) -> ProviderResult<Self> {
        let mut client = Self::build(
            config.api_key.clone(),
            config.api_base.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        client.system_instruction = config
            .system_instruction
            .clone()
            .filter(|s| !s.trim().is_empty());
        client.temperature = config.temperature;
        client.max_output_tokens = config.max_output_tokens;
        Ok(client)
    }

    fn build(
        api_key: String,
        api_base: String,
        model: String,
        timeout: Duration,
    ) -> ProviderResult<Self> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::ConfigError(
                "Gemini API key is not set (GEMINI_API_KEY)".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            model,
            system_instruction: None,
            temperature: None,
            max_output_tokens: None,
        })
    }

    /// Override the endpoint base, e.g. for a proxy
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Add a system instruction sent alongside every request
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    fn build_request(&self, history: &[Turn], prompt: &str) -> GenerateContentRequest {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| Content {
                role: api_role(turn.role),
                parts: vec![Part {
                    text: turn.text.clone(),
                }],
            })
            .collect();
        contents.push(Content {
            role: api_role(Role::User),
            parts: vec![Part {
                text: prompt.to_string(),
            }],
        });

        let generation_config = if self.temperature.is_some() || self.max_output_tokens.is_some() {
            Some(GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            })
        } else {
            None
        };

        GenerateContentRequest {
            contents,
            system_instruction: self.system_instruction.as_ref().map(|text| SystemInstruction {
                parts: vec![Part { text: text.clone() }],
            }),
            generation_config,
        }
    }

    fn parse_response(response: GenerateContentResponse) -> ProviderResult<String> {
        if response.candidates.is_empty() {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!("prompt blocked: {}", r))
                .unwrap_or_else(|| "no candidates in response".to_string());
            return Err(ProviderError::InvalidResponse(reason));
        }

        let candidate = &response.candidates[0];
        let text: String = candidate
            .content
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.is_empty() {
            let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
            return Err(ProviderError::InvalidResponse(format!(
                "candidate has no text (finish reason: {})",
                reason
            )));
        }

        Ok(text)
    }
}

/// Gemini names the assistant side `model`
fn api_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .map(|wrapper| {
            let message = wrapper.error.message.unwrap_or_else(|| body.to_string());
            match wrapper.error.status.filter(|s| !s.is_empty()) {
                Some(status) => format!("{}: {}", status, message),
                None => message,
            }
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn generate(&self, history: &[Turn], prompt: &str) -> ProviderResult<String> {
        let request = self.build_request(history, prompt);
        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);

        debug!(
            "Sending generateContent to {} with {} prior turns",
            url,
            history.len()
        );

        // Header auth keeps the key out of URLs that reqwest errors echo back
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::ApiError(format!(
                "HTTP {}: {}",
                status,
                api_error_message(&body)
            )));
        }

        let body: GenerateContentResponse = response.json().await?;
        Self::parse_response(body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
