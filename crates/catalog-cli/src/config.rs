//! YAML configuration for the command line

use std::path::Path;

use anyhow::Context;
use catalog_assist::AssistConfig;
use catalog_mapping::MatcherConfig;
use catalog_schema::ROOT_ELEMENT;
use serde::Deserialize;

/// Settings file; every key is optional and command-line flags win
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub assist: Option<AssistConfig>,
    pub avro_namespace: Option<String>,
    pub root_element: Option<String>,
    pub match_batch_size: Option<usize>,
    pub min_semantic_confidence: Option<f64>,
}

impl CliConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn root_element(&self) -> &str {
        self.root_element.as_deref().unwrap_or(ROOT_ELEMENT)
    }

    pub fn matcher_config(&self) -> MatcherConfig {
        let mut config = MatcherConfig::default();
        if let Some(batch_size) = self.match_batch_size {
            config.batch_size = batch_size.max(1);
        }
        if let Some(confidence) = self.min_semantic_confidence {
            config.min_semantic_confidence = confidence;
        }
        config
    }

    /// Assistant settings from the file, else from the environment
    pub fn assist_config(&self) -> catalog_assist::Result<AssistConfig> {
        match &self.assist {
            Some(assist) => {
                let mut assist = assist.clone();
                assist.fill_from_env();
                assist.validate()?;
                Ok(assist)
            }
            None => AssistConfig::from_env(),
        }
    }
}
