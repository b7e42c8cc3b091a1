//! OpenAI-compatible chat completion client.
//!
//! Works against any endpoint that speaks the `/chat/completions` protocol
//! (OpenAI, OpenRouter, local servers).

use std::time::Duration;

use contextkeys_shared::{ContextKeysError, GenerationConfig, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::KeywordGenerator;

/// User-Agent string for generation requests.
const USER_AGENT: &str = concat!("ContextKeys/", env!("CARGO_PKG_VERSION"));

/// How much of an error body is echoed back in error messages.
const ERROR_BODY_EXCERPT: usize = 200;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Keyword generator backed by a chat completion endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiGenerator {
    /// Build a generator from config and an already-resolved API key.
    pub fn new(config: &GenerationConfig, api_key: impl Into<String>) -> Result<Self> {
        let base = config.base_url()?;
        let endpoint = format!("{}/chat/completions", base.as_str().trim_end_matches('/'));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ContextKeysError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl KeywordGenerator for OpenAiGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
        };

        info!(endpoint = %self.endpoint, "requesting keywords");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ContextKeysError::Network(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(ERROR_BODY_EXCERPT).collect();
            return Err(ContextKeysError::Generation(format!(
                "HTTP {status}: {excerpt}"
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            ContextKeysError::Generation(format!("invalid completion response: {e}"))
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default();

        debug!(completion = %text, "completion received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> GenerationConfig {
        GenerationConfig {
            base_url: format!("{}/v1", server.uri()),
            model: "test-model".into(),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    #[test]
    fn endpoint_joins_base_url() {
        let config = GenerationConfig {
            base_url: "https://api.example.com/v1/".into(),
            ..Default::default()
        };
        let generator = OpenAiGenerator::new(&config, "k").unwrap();
        assert_eq!(generator.endpoint(), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn rejects_invalid_base_url() {
        let config = GenerationConfig {
            base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(OpenAiGenerator::new(&config, "k").is_err());
    }

    #[tokio::test]
    async fn generate_returns_first_choice() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "messages": [{"role": "user", "content": "prompt text"}],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "keywords: rust, parsing"}},
                    {"message": {"role": "assistant", "content": "ignored"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let generator = OpenAiGenerator::new(&config_for(&server), "secret").unwrap();
        let text = generator.generate("prompt text").await.unwrap();
        assert_eq!(text, "keywords: rust, parsing");
    }

    #[tokio::test]
    async fn missing_content_is_empty_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant"}}]
            })))
            .mount(&server)
            .await;

        let generator = OpenAiGenerator::new(&config_for(&server), "k").unwrap();
        assert_eq!(generator.generate("p").await.unwrap(), "");
    }

    #[tokio::test]
    async fn no_choices_is_empty_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let generator = OpenAiGenerator::new(&config_for(&server), "k").unwrap();
        assert_eq!(generator.generate("p").await.unwrap(), "");
    }

    #[tokio::test]
    async fn http_error_is_generation_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let generator = OpenAiGenerator::new(&config_for(&server), "bad").unwrap();
        let err = generator.generate("p").await.unwrap_err();
        assert!(matches!(err, ContextKeysError::Generation(_)));
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("invalid api key"));
    }

    #[tokio::test]
    async fn malformed_json_is_generation_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let generator = OpenAiGenerator::new(&config_for(&server), "k").unwrap();
        let err = generator.generate("p").await.unwrap_err();
        assert!(err.to_string().contains("invalid completion response"));
    }
}
