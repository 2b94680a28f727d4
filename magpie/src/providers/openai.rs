//! OpenAI-compatible chat completions client.
//!
//! Works against any endpoint exposing the `POST {base_url}/chat/completions`
//! contract, which in practice covers OpenAI itself and the long tail of
//! gateways that mimic it.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{ChatModel, LlmError};
use crate::config::Config;
use crate::error::ConfigError;
use crate::message::ChatMessage;

/// Chat model backed by an OpenAI-compatible HTTP endpoint.
#[derive(Clone)]
pub struct OpenAiCompatModel {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for OpenAiCompatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatModel")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

impl OpenAiCompatModel {
    /// Create a model from explicit parts.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Create a model from [`Config`], requiring the API key to be set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when no API key is configured.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let api_key = config.require_llm_api_key()?;
        Ok(Self::new(
            config.llm_base_url.clone(),
            api_key,
            config.llm_model.clone(),
        ))
    }

    /// The configured model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatModel {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
        };

        debug!(model = %self.model, message_count = messages.len(), "chat request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::http_status(status.as_u16(), body));
        }

        let body: Value = response.json().await?;
        body["choices"][0]["message"]["content"]
            .as_str()
            .map(ToString::to_string)
            .ok_or_else(|| {
                LlmError::response_format("missing choices[0].message.content in reply")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_the_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({"model": "test-model"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "hello there"}}]
            })))
            .mount(&server)
            .await;

        let model = OpenAiCompatModel::new(server.uri(), "key", "test-model");
        let reply = model
            .generate(&[ChatMessage::user("hi")])
            .await
            .unwrap();
        assert_eq!(reply, "hello there");
    }

    #[tokio::test]
    async fn non_success_status_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let model = OpenAiCompatModel::new(server.uri(), "key", "test-model");
        let err = model.generate(&[ChatMessage::user("hi")]).await.unwrap_err();
        match err {
            LlmError::HttpStatus { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_content_is_a_format_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let model = OpenAiCompatModel::new(server.uri(), "key", "test-model");
        let err = model.generate(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, LlmError::ResponseFormat(_)));
    }

    #[test]
    fn from_config_requires_an_api_key() {
        let config = Config::default();
        assert!(OpenAiCompatModel::from_config(&config).is_err());
    }
}
