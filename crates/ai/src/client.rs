//! Chat-completion HTTP client.
//!
//! One request per call, single attempt, fixed timeout.

use std::time::Duration;

use pairmatch_config::{AiSettings, ResolvedAiConfig};
use serde::{Deserialize, Serialize};

/// Error from a completion request
#[derive(Debug, Clone, PartialEq)]
pub enum AiError {
    /// No API key in the environment
    MissingKey,
    /// Transport failure (DNS, connect, timeout)
    Network(String),
    /// Non-success HTTP status
    Api { status: u16, message: String },
    /// Body was not the expected JSON
    Parse(String),
    /// JSON parsed but carried no usable text
    InvalidResponse(String),
}

impl std::fmt::Display for AiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiError::MissingKey => write!(f, "API key not configured"),
            AiError::Network(msg) => write!(f, "Network error: {}", msg),
            AiError::Api { status, message } => write!(f, "API error ({}): {}", status, message),
            AiError::Parse(msg) => write!(f, "Failed to parse response: {}", msg),
            AiError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for AiError {}

// ============================================================================
// OpenAI API types
// ============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ============================================================================
// Client
// ============================================================================

/// Chat-completion client (blocking).
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::blocking::Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatClient {
    /// Build from resolved configuration. Fails if no key was found.
    pub fn new(config: &ResolvedAiConfig) -> Result<Self, AiError> {
        let api_key = config.api_key.clone().ok_or(AiError::MissingKey)?;
        Self::build(
            api_key,
            &config.endpoint,
            &config.model,
            config.temperature,
            config.max_tokens,
            config.timeout,
        )
    }

    /// Client against an arbitrary base URL with default model parameters.
    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Result<Self, AiError> {
        let defaults = AiSettings::default();
        Self::build(
            api_key.into(),
            base_url,
            &defaults.model,
            defaults.temperature,
            defaults.max_tokens,
            Duration::from_secs(defaults.timeout_secs),
        )
    }

    fn build(
        api_key: String,
        base_url: &str,
        model: &str,
        temperature: f32,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<Self, AiError> {
        if api_key.trim().is_empty() {
            return Err(AiError::MissingKey);
        }
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("pairmatch/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model: model.to_string(),
            temperature,
            max_tokens,
        })
    }

    /// Send one system + user exchange and return the first choice's text.
    pub fn complete(&self, system: &str, user: &str) -> Result<String, AiError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        log::debug!("POST {} (model {})", self.url, self.model);
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| AiError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| AiError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorBody>(&body) {
                Ok(err) => err.error.message,
                Err(_) if body.trim().is_empty() => status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
                Err(_) => truncate(&body, 200),
            };
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| AiError::Parse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AiError::InvalidResponse("no choices in response".to_string()))?
            .message
            .content
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(AiError::InvalidResponse("empty message content".to_string()));
        }
        Ok(content)
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_complete_sends_bearer_and_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("Authorization", "Bearer sk-test")
                .body_includes(r#""model":"gpt-4o""#)
                .body_includes(r#""max_tokens":1500"#)
                .body_includes(r#""role":"system""#);
            then.status(200).json_body(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "hello" } }]
            }));
        });

        let client = ChatClient::with_base_url("sk-test", &server.base_url()).unwrap();
        assert_eq!(client.complete("sys", "user").unwrap(), "hello");
        mock.assert();
    }

    #[test]
    fn test_api_error_message_extracted() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(401).json_body(serde_json::json!({
                "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
            }));
        });

        let client = ChatClient::with_base_url("sk-bad", &server.base_url()).unwrap();
        let err = client.complete("sys", "user").unwrap_err();
        assert_eq!(
            err,
            AiError::Api { status: 401, message: "Incorrect API key provided".into() }
        );
    }

    #[test]
    fn test_no_choices_is_invalid() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(serde_json::json!({ "choices": [] }));
        });

        let client = ChatClient::with_base_url("sk-test", &server.base_url()).unwrap();
        assert!(matches!(
            client.complete("sys", "user"),
            Err(AiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_null_content_is_invalid() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(serde_json::json!({
                "choices": [{ "message": { "content": null } }]
            }));
        });

        let client = ChatClient::with_base_url("sk-test", &server.base_url()).unwrap();
        assert!(matches!(
            client.complete("sys", "user"),
            Err(AiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).body("<html>gateway</html>");
        });

        let client = ChatClient::with_base_url("sk-test", &server.base_url()).unwrap();
        assert!(matches!(client.complete("sys", "user"), Err(AiError::Parse(_))));
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            ChatClient::with_base_url("  ", "http://localhost"),
            Err(AiError::MissingKey)
        ));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
