use async_trait::async_trait;
use log::{ debug, warn };
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };
use serde_json::Value;
use std::error::Error as StdError;
use std::time::Duration;

use super::{ ChatClient, ChatMessage, CompletionRequest, CompletionResponse };
use crate::llm::{ LlmConfig, LlmError };

pub const DEFAULT_CHAT_URL: &str = "https://api.deepinfra.com/v1/openai/chat/completions";

/// Client for any OpenAI-compatible `/chat/completions` endpoint (DeepInfra by default).
pub struct OpenAIChatClient {
    http: HttpClient,
    base_url: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: &'a Value,
    max_tokens: &'a Value,
    top_p: &'a Value,
    min_p: &'a Value,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Deserialize)]
struct OpenAIMessage {
    content: String,
}

impl OpenAIChatClient {
    pub fn new(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let api_url = base_url.unwrap_or_else(|| DEFAULT_CHAT_URL.to_string());
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        match api_key.filter(|k| !k.trim().is_empty()) {
            Some(key) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", key))
                    .map_err(|e| format!("Invalid API key format: {}", e))?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            None => warn!("No upstream API key configured; requests will be sent unauthenticated"),
        }

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self {
            http,
            base_url: api_url,
            timeout,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        Self::new(config.api_key.clone(), config.base_url.clone(), config.timeout)
    }

    fn map_transport(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() { LlmError::Timeout(self.timeout) } else { LlmError::Transport(e) }
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let params = &request.params;
        let req = OpenAIChatRequest {
            model: &params.model,
            messages: &request.messages,
            temperature: &params.temperature,
            max_tokens: &params.max_tokens,
            top_p: &params.top_p,
            min_p: &params.min_p,
        };
        debug!(
            "Sending {} messages to {} (model {})",
            request.messages.len(),
            self.base_url,
            params.model
        );

        let resp = self.http
            .post(&self.base_url)
            .json(&req)
            .send().await
            .map_err(|e| self.map_transport(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.map_transport(e))?;
        if !status.is_success() {
            return Err(LlmError::Status { status, body });
        }

        let parsed = serde_json::from_str::<OpenAIResponse>(&body)
            .map_err(|e| LlmError::Malformed(e.to_string()))?;
        let content = parsed.choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Malformed("No choices in upstream response".to_string()))?
            .message.content;

        Ok(CompletionResponse { response: content })
    }
}
