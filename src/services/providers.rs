// Completion Provider Service
// OpenAI-compatible chat-completions client used by both audit tools

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Instant;
use thiserror::Error;

const OPENAI_DEFAULT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Overall HTTP timeout for one completion request.
const REQUEST_TIMEOUT_SECS: u64 = 80;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Missing content in response")]
    MissingContent,
    #[error("JSON parse error: {0}")]
    JsonError(String),
    #[error("API key not configured")]
    MissingApiKey,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: i32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResult {
    pub content: String,
    pub latency_ms: i64,
}

pub struct CompletionClient {
    client: Client,
    base_url: String,
}

impl Default for CompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionClient {
    pub fn new() -> Self {
        Self::with_base_url(resolve_base_url(None))
    }

    /// Client pointed at a custom OpenAI-compatible endpoint (config
    /// override or a local proxy).
    pub fn with_base_url(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one system+user exchange and return the reply content.
    /// `use_json_format` asks the endpoint for a json_object response; the
    /// prompt must itself mention JSON for that to be accepted upstream.
    pub async fn call_chat(
        &self,
        model: &str,
        api_key: &str,
        system: &str,
        user: &str,
        max_tokens: i32,
        temperature: f64,
        use_json_format: bool,
    ) -> Result<ChatResult, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens,
            temperature,
            response_format: if use_json_format {
                Some(ResponseFormat {
                    r#type: "json_object".to_string(),
                })
            } else {
                None
            },
        };

        let start = Instant::now();

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let latency_ms = start.elapsed().as_millis() as i64;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let data: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::JsonError(e.to_string()))?;

        let content = data
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or(ProviderError::MissingContent)?;

        Ok(ChatResult {
            content: content.trim().to_string(),
            latency_ms,
        })
    }
}

/// Endpoint resolution order: config override, then environment
/// (POLICHECK_OPENAI_URL, OPENAI_API_URL), then the public default.
pub fn resolve_base_url(config_override: Option<&str>) -> String {
    if let Some(url) = config_override {
        let trimmed = url.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    for key in ["POLICHECK_OPENAI_URL", "OPENAI_API_URL"] {
        if let Ok(val) = env::var(key) {
            let v = val.trim();
            if !v.is_empty() {
                return v.to_string();
            }
        }
    }
    OPENAI_DEFAULT_URL.to_string()
}

/// Get the OpenAI API key from environment or the config file.
pub fn get_api_key() -> Option<String> {
    for key in ["OPENAI_API_KEY", "POLICHECK_OPENAI_API_KEY"] {
        if let Ok(val) = env::var(key) {
            let v = val.trim();
            if !v.is_empty() {
                return Some(v.to_string());
            }
        }
    }

    if let Some(config_dir) = super::ConfigStore::default_config_dir() {
        let store = super::ConfigStore::new(config_dir);
        if let Ok(Some(key)) = store.get_api_key("openai") {
            return Some(key);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let client = CompletionClient::with_base_url(OPENAI_DEFAULT_URL.to_string());
        assert!(client.base_url().contains("api.openai.com"));
    }

    #[test]
    fn test_resolve_base_url_prefers_override() {
        let url = resolve_base_url(Some("https://proxy.example/v1/chat/completions"));
        assert_eq!(url, "https://proxy.example/v1/chat/completions");
        let blank = resolve_base_url(Some("   "));
        assert!(blank.ends_with("/chat/completions"));
    }

    #[test]
    fn test_chat_request_serialization_skips_absent_format() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![],
            max_tokens: 64,
            temperature: 0.0,
            response_format: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("response_format"));
    }
}
