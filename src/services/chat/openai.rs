//! OpenAI chat completions responder
//!
//! - Endpoint: `POST {api_url}/chat/completions`
//! - Auth: `Authorization: Bearer {api_key}`
//! - Body: `{ model, messages: [system, user] }`
//! - Reply: `choices[0].message.content`
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use super::ChatResponder;
use crate::error::{AppError, AppResult};

const SYSTEM_PROMPT: &str = "You are a helpful AI movie assistant.";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI error envelope: `{"error": {"message": ...}}`
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiChat {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl OpenAiChat {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    fn build_request<'a>(&'a self, user_text: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: user_text,
                },
            ],
        }
    }
}

/// First non-blank reply in a completion response
fn extract_reply(response: ChatCompletionResponse) -> AppResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| AppError::ChatService("Chat service returned an empty reply".to_string()))
}

#[async_trait::async_trait]
impl ChatResponder for OpenAiChat {
    async fn respond(&self, user_text: &str) -> AppResult<String> {
        if user_text.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Chat message cannot be empty".to_string(),
            ));
        }

        let url = format!("{}/chat/completions", self.api_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_request(user_text))
            .send()
            .await
            .map_err(|e| AppError::ChatService(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .ok()
                .and_then(|envelope| envelope.error)
                .and_then(|detail| detail.message)
                .unwrap_or(body);
            return Err(AppError::ChatService(format!(
                "API returned status {}: {}",
                status, message
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::ChatService(e.to_string()))?;
        let reply = extract_reply(completion)?;

        tracing::info!(
            model = %self.model,
            reply_chars = reply.len(),
            responder = "openai",
            "Chat reply received"
        );

        Ok(reply)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
