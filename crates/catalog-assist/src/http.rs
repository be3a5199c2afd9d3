//! Blocking HTTP completion client

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::client::CompletionClient;
use crate::config::{AssistConfig, Provider};
use crate::{AssistError, Result};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

/// Chat client for OpenAI-compatible and Anthropic messages endpoints
pub struct HttpCompletionClient {
    config: AssistConfig,
    client: Client,
}

impl HttpCompletionClient {
    /// Build a client; fails when the configuration has no API key
    pub fn new(config: AssistConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AssistError::Configuration(format!("HTTP client setup failed: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &AssistConfig {
        &self.config
    }

    fn request_body(&self, system: &str, user: &str) -> Value {
        match self.config.provider {
            Provider::OpenAi => json!({
                "model": self.config.model_name(),
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": user },
                ],
                "temperature": self.config.temperature,
            }),
            Provider::Anthropic => json!({
                "model": self.config.model_name(),
                "max_tokens": MAX_TOKENS,
                "system": system,
                "messages": [{ "role": "user", "content": user }],
                "temperature": self.config.temperature,
            }),
        }
    }

    fn send(&self, body: &Value) -> Result<String> {
        let request = match self.config.provider {
            Provider::OpenAi => self
                .client
                .post(format!("{}/chat/completions", self.config.base_url()))
                .bearer_auth(&self.config.api_key),
            Provider::Anthropic => self
                .client
                .post(format!("{}/messages", self.config.base_url()))
                .header("x-api-key", &self.config.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
        };

        let response = request
            .json(body)
            .send()
            .map_err(|e| AssistError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(AssistError::Request(format!(
                "{} API error {status}: {detail}",
                self.config.provider
            )));
        }

        response
            .text()
            .map_err(|e| AssistError::Request(e.to_string()))
    }
}

impl CompletionClient for HttpCompletionClient {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        debug!(
            provider = %self.config.provider,
            model = self.config.model_name(),
            prompt_chars = user.len(),
            "Sending completion request"
        );
        let body = self.send(&self.request_body(system, user))?;
        reply_text(self.config.provider, &body)
    }

    fn name(&self) -> &str {
        self.config.provider.as_str()
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Reply text from a provider response body
fn reply_text(provider: Provider, body: &str) -> Result<String> {
    let invalid = |e: serde_json::Error| AssistError::InvalidResponse(e.to_string());
    let text = match provider {
        Provider::OpenAi => serde_json::from_str::<ChatResponse>(body)
            .map_err(invalid)?
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content),
        Provider::Anthropic => serde_json::from_str::<MessagesResponse>(body)
            .map_err(invalid)?
            .content
            .into_iter()
            .find_map(|block| block.text),
    };
    text.ok_or_else(|| AssistError::InvalidResponse(format!("empty {provider} response")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let err = HttpCompletionClient::new(AssistConfig::new(Provider::OpenAi))
            .err()
            .expect("missing key must be rejected");
        assert!(matches!(err, AssistError::Configuration(_)));
    }

    #[test]
    fn test_request_bodies() {
        let openai =
            HttpCompletionClient::new(AssistConfig::new(Provider::OpenAi).with_api_key("k")).unwrap();
        let body = openai.request_body("sys", "hello");
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");

        let anthropic = HttpCompletionClient::new(
            AssistConfig::new(Provider::Anthropic)
                .with_api_key("k")
                .with_model("claude-test"),
        )
        .unwrap();
        let body = anthropic.request_body("sys", "hello");
        assert_eq!(body["system"], "sys");
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(anthropic.name(), "anthropic");
    }

    #[test]
    fn test_reply_text() {
        let openai = r#"{"choices":[{"message":{"role":"assistant","content":"hi"}}]}"#;
        assert_eq!(reply_text(Provider::OpenAi, openai).unwrap(), "hi");

        let anthropic = r#"{"content":[{"type":"text","text":"hello"}]}"#;
        assert_eq!(reply_text(Provider::Anthropic, anthropic).unwrap(), "hello");

        assert!(matches!(
            reply_text(Provider::OpenAi, r#"{"choices":[]}"#),
            Err(AssistError::InvalidResponse(_))
        ));
        assert!(matches!(
            reply_text(Provider::Anthropic, "not json"),
            Err(AssistError::InvalidResponse(_))
        ));
    }
}
