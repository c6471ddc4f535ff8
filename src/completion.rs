//! Chat-completion backends.
//!
//! - **[`OpenAiClient`]**: calls `POST {base_url}/chat/completions`.
//! - **[`DisabledClient`]**: always fails with [`AiError::MissingCredential`];
//!   used when no API key is configured.
//!
//! Use [`create_client`] to pick one from configuration. The credential is
//! read once, when the client is created.
//!
//! # Error Mapping
//!
//! Upstream failures are classified so the HTTP layer can surface the two
//! cases users can act on:
//! - HTTP 401 or `error.code == "invalid_api_key"` → [`AiError::InvalidApiKey`]
//! - `error.code == "insufficient_quota"` → [`AiError::QuotaExceeded`]
//! - anything else non-2xx → [`AiError::Api`]
//!
//! No retries are performed.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AiConfig;
use crate::traits::{CompletionClient, CompletionRequest};

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("AI credential is not configured")]
    MissingCredential,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("API quota exceeded")]
    QuotaExceeded,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),
}

// ============ Disabled Client ============

/// A completion client with no credential behind it.
pub struct DisabledClient;

#[async_trait]
impl CompletionClient for DisabledClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, AiError> {
        Err(AiError::MissingCredential)
    }
}

// ============ OpenAI Client ============

/// Completion client for the OpenAI chat-completions API (or any
/// compatible endpoint reachable at `ai.base_url`).
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(config: &AiConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AiError> {
        let body = request_body(&request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), &body_text));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AiError::MalformedResponse(e.to_string()))?;
        parse_completion_response(&json)
    }
}

/// Chat-completions body: system prompt first, then the conversation.
fn request_body(request: &CompletionRequest) -> serde_json::Value {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    messages.push(serde_json::json!({
        "role": "system",
        "content": request.system_prompt,
    }));
    for msg in &request.messages {
        messages.push(serde_json::json!({
            "role": msg.role,
            "content": msg.content,
        }));
    }

    serde_json::json!({
        "model": request.model,
        "messages": messages,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
        "stream": false,
    })
}

/// Map a non-success response to an [`AiError`].
fn classify_error(status: u16, body: &str) -> AiError {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));
    let code = error
        .and_then(|e| e.get("code"))
        .and_then(|c| c.as_str())
        .unwrap_or("");
    let message = error
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .unwrap_or(body)
        .to_string();

    match code {
        "invalid_api_key" => AiError::InvalidApiKey,
        "insufficient_quota" => AiError::QuotaExceeded,
        _ if status == 401 => AiError::InvalidApiKey,
        _ => AiError::Api { status, message },
    }
}

/// Extract `choices[0].message.content`.
fn parse_completion_response(json: &serde_json::Value) -> Result<String, AiError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| AiError::MalformedResponse("missing choices[0].message.content".into()))
}

/// Create the appropriate [`CompletionClient`] based on configuration.
///
/// Returns an [`OpenAiClient`] when the credential variable is set and a
/// [`DisabledClient`] otherwise.
pub fn create_client(config: &AiConfig) -> Result<Arc<dyn CompletionClient>> {
    match config.api_key() {
        Some(key) => Ok(Arc::new(OpenAiClient::new(config, key)?)),
        None => {
            tracing::info!(
                "{} not set; AI features will use offline fallbacks",
                config.api_key_env
            );
            Ok(Arc::new(DisabledClient))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatMessage;

    #[test]
    fn test_request_body_carries_exact_temperature() {
        let config = AiConfig::default();
        let body = request_body(&CompletionRequest {
            model: config.analyzer_model.clone(),
            system_prompt: "sys".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
            max_tokens: config.analyzer_max_tokens,
            temperature: config.analyzer_temperature,
        });

        let text = body.to_string();
        assert!(text.contains("\"temperature\":0.3"));
        assert!(!text.contains("0.3000000"));
        assert_eq!(body["temperature"], serde_json::json!(0.3));
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn test_classify_invalid_key_by_code() {
        let body = r#"{"error":{"message":"Incorrect API key","code":"invalid_api_key"}}"#;
        assert!(matches!(classify_error(401, body), AiError::InvalidApiKey));
    }

    #[test]
    fn test_classify_unauthorized_without_body() {
        assert!(matches!(classify_error(401, ""), AiError::InvalidApiKey));
    }

    #[test]
    fn test_classify_quota() {
        let body = r#"{"error":{"message":"quota","type":"insufficient_quota","code":"insufficient_quota"}}"#;
        assert!(matches!(classify_error(429, body), AiError::QuotaExceeded));
    }

    #[test]
    fn test_classify_rate_limit_is_generic() {
        let body = r#"{"error":{"message":"slow down","code":"rate_limit_exceeded"}}"#;
        match classify_error(429, body) {
            AiError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "slow down");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_completion_response() {
        let json = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "Hello" } }]
        });
        assert_eq!(parse_completion_response(&json).unwrap(), "Hello");
    }

    #[test]
    fn test_parse_completion_response_missing_content() {
        let json = serde_json::json!({ "choices": [] });
        assert!(matches!(
            parse_completion_response(&json),
            Err(AiError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_disabled_client() {
        let request = CompletionRequest {
            model: "m".to_string(),
            system_prompt: String::new(),
            messages: vec![],
            max_tokens: 1,
            temperature: 0.0,
        };
        assert!(matches!(
            DisabledClient.complete(request).await,
            Err(AiError::MissingCredential)
        ));
    }
}
