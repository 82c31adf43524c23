//! Language-model collaborator
//!
//! The normalizer only sees [`TextGenerator`]: an instruction goes in, text
//! comes out, and any failure is a [`CollaboratorError`]. [`OpenAiGenerator`]
//! implements it against an OpenAI-compatible chat-completions endpoint.

use crate::config::LlmConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Failures of the language-model collaborator
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("response contained no text")]
    Empty,
}

/// One generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub instruction: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Text-in, text-out model interface
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, CollaboratorError>;
}

/// Builds the rewrite instruction around the pretty-printed source record
pub fn build_instruction(source_json: &str) -> String {
    format!(
        "Rewrite the following technical documentation as clear, flowing prose for \
non-specialist readers.\n\
\n\
Original content:\n\
{}\n\
\n\
Please provide:\n\
1. A clear title\n\
2. A brief overview (2-3 sentences)\n\
3. Main concepts explained simply\n\
4. Step-by-step instructions where applicable\n\
5. Real-world use cases\n\
6. Links to source materials\n\
\n\
Format as clean markdown.",
        source_json
    )
}

/// Chat-completions client
pub struct OpenAiGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl OpenAiGenerator {
    /// Creates a generator for `{base_url}/chat/completions`
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
        })
    }

    fn headers(&self) -> Result<HeaderMap, CollaboratorError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| CollaboratorError::Transport("invalid API key".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, CollaboratorError> {
        let body = ChatRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.instruction,
            }],
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| CollaboratorError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(CollaboratorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| CollaboratorError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(CollaboratorError::Empty)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}
