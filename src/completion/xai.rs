//! xAI backend — chat completions over the OpenAI-compatible HTTP API.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CompletionBackend, Turn};
use crate::config::CompletionConfig;
use crate::error::CompletionError;

/// HTTP backend for the xAI chat-completions endpoint.
#[derive(Debug)]
pub struct XaiBackend {
    http: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl XaiBackend {
    /// Build a backend from connection settings.
    ///
    /// Fails with `Auth` when no credential is configured and `Connection`
    /// when the HTTP client cannot be constructed.
    pub fn new(config: &CompletionConfig) -> Result<Self, CompletionError> {
        let key = config.api_key.expose_secret();
        if key.trim().is_empty() {
            return Err(CompletionError::Auth("API key is not set".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|_| CompletionError::Auth("API key contains invalid characters".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| CompletionError::Connection(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.api_host.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout: config.timeout,
        })
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait::async_trait]
impl CompletionBackend for XaiBackend {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, turns: &[Turn]) -> Result<String, CompletionError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: turns,
        };

        debug!(model = %self.model, turns = turns.len(), "Requesting completion");
        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, self.timeout))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CompletionError::Auth(format!(
                "endpoint rejected credentials ({status})"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Upstream(format!(
                "status {status}: {}",
                truncate(&body, 200)
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Upstream(format!("malformed response body: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::Upstream("response contained no choices".to_string()))
    }
}

fn classify_transport_error(e: reqwest::Error, timeout: Duration) -> CompletionError {
    if e.is_timeout() {
        CompletionError::Timeout(timeout)
    } else if e.is_connect() {
        CompletionError::Connection(e.to_string())
    } else {
        CompletionError::Upstream(e.to_string())
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn config(key: &str, host: &str) -> CompletionConfig {
        CompletionConfig {
            api_key: SecretString::from(key.to_string()),
            api_host: host.to_string(),
            model: "grok-4".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn empty_api_key_is_an_auth_error() {
        let err = XaiBackend::new(&config("", "https://api.x.ai")).unwrap_err();
        assert!(matches!(err, CompletionError::Auth(_)));

        let err = XaiBackend::new(&config("   ", "https://api.x.ai")).unwrap_err();
        assert!(matches!(err, CompletionError::Auth(_)));
    }

    #[test]
    fn host_trailing_slash_is_trimmed() {
        let backend = XaiBackend::new(&config("key", "https://api.x.ai/")).unwrap();
        assert_eq!(backend.base_url, "https://api.x.ai");
        assert_eq!(backend.model(), "grok-4");
    }

    #[test]
    fn request_serializes_openai_shape() {
        let turns = vec![Turn::system("sys"), Turn::user("hi")];
        let request = ChatCompletionRequest {
            model: "grok-4",
            messages: &turns,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "grok-4");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 2), "he");
        assert_eq!(truncate("héllo", 2), "hé");
    }
}
