//! Assistant configuration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{AssistError, Result};

/// Language-model provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    Anthropic,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o",
            Provider::Anthropic => "claude-3-5-sonnet-20241022",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Anthropic => "https://api.anthropic.com/v1",
        }
    }

    /// Environment variable holding the API key
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Environment variable overriding the model name
    pub fn model_var(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_MODEL",
            Provider::Anthropic => "ANTHROPIC_MODEL",
        }
    }
}

impl FromStr for Provider {
    type Err = AssistError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            other => Err(AssistError::Configuration(format!(
                "Unsupported provider '{other}'. Supported: openai, anthropic"
            ))),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit settings for the assistant; nothing is read from the
/// environment unless [`AssistConfig::from_env`] is called
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
    pub provider: Provider,
    /// Model name; the provider default when empty
    pub model: String,
    pub api_key: String,
    /// Endpoint root; the provider default when unset
    pub base_url: Option<String>,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl AssistConfig {
    /// Configuration for `provider` with its default model and no key
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            model: String::new(),
            api_key: String::new(),
            base_url: None,
            temperature: 0.3,
            timeout_seconds: 60,
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Read `LLM_PROVIDER`, the provider's API key and optional model override
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AssistConfig::from_env`] over an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let provider = match lookup("LLM_PROVIDER").filter(|v| !v.trim().is_empty()) {
            Some(name) => name.parse()?,
            None => Provider::default(),
        };

        let mut config = Self::new(provider);
        if let Some(model) = lookup(provider.model_var()).filter(|v| !v.trim().is_empty()) {
            config.model = model;
        }
        config.api_key = lookup(provider.api_key_var())
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                AssistError::Configuration(format!("{} not set", provider.api_key_var()))
            })?;
        Ok(config)
    }

    /// Fill the key from the environment when a loaded configuration left it empty
    pub fn fill_from_env(&mut self) {
        if self.api_key.is_empty() {
            if let Ok(key) = std::env::var(self.provider.api_key_var()) {
                self.api_key = key;
            }
        }
    }

    /// Fail when the configuration cannot authenticate
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(AssistError::Configuration(format!(
                "no API key configured for provider {} (set {})",
                self.provider,
                self.provider.api_key_var()
            )));
        }
        Ok(())
    }

    pub fn model_name(&self) -> &str {
        match self.model.trim() {
            "" => self.provider.default_model(),
            model => model,
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
            .trim_end_matches('/')
    }
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self::new(Provider::default())
    }
}

impl fmt::Debug for AssistConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_to_openai() {
        let config = AssistConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.model_name(), "gpt-4o");
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.base_url(), "https://api.openai.com/v1");
    }

    #[test]
    fn test_anthropic_with_model_override() {
        let config = AssistConfig::from_lookup(lookup(&[
            ("LLM_PROVIDER", "Anthropic"),
            ("ANTHROPIC_API_KEY", "key"),
            ("ANTHROPIC_MODEL", "claude-test"),
            ("OPENAI_MODEL", "ignored"),
        ]))
        .unwrap();
        assert_eq!(config.provider, Provider::Anthropic);
        assert_eq!(config.model_name(), "claude-test");
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let err = AssistConfig::from_lookup(lookup(&[("LLM_PROVIDER", "anthropic")])).unwrap_err();
        assert!(matches!(err, AssistError::Configuration(ref m) if m.contains("ANTHROPIC_API_KEY")));
    }

    #[test]
    fn test_unknown_provider() {
        let err = AssistConfig::from_lookup(lookup(&[("LLM_PROVIDER", "acme")])).unwrap_err();
        assert!(err.to_string().contains("Unsupported provider 'acme'"));
    }

    #[test]
    fn test_validate_and_redaction() {
        let config = AssistConfig::new(Provider::OpenAi);
        assert!(config.validate().is_err());

        let config = config
            .with_api_key("secret")
            .with_base_url("http://localhost:8080/v1/");
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url(), "http://localhost:8080/v1");
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: AssistConfig =
            serde_json::from_str(r#"{"provider":"anthropic"}"#).unwrap();
        assert_eq!(config.provider, Provider::Anthropic);
        assert_eq!(config.model_name(), "claude-3-5-sonnet-20241022");
        assert_eq!(config.timeout_seconds, 60);
        assert!(config.api_key.is_empty());
    }
}
