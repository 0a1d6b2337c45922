//! YAML configuration for collaborator endpoints and the source roster.
//!
//! Resolution order: explicit `--config` path, then the `OPINION_MAP_CONFIG`
//! environment variable, then built-in defaults. Every field has a serde
//! default so a partial file works:
//!
//! ```yaml
//! collector:
//!   api_base: "https://www.reddit.com"
//!   per_source_timeout_secs: 30
//!   sources: [NeutralPolitics, changemyview, AskReddit]
//! embedding:
//!   api_base: "http://localhost:8100/v1"
//!   model: "all-MiniLM-L6-v2"
//!   batch_size: 32
//! numeric:
//!   api_base: "http://localhost:8200"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Minimum number of named sources the collector contract asks for.
pub const MIN_SOURCES: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub numeric: NumericConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Base URL of the platform's public JSON API.
    #[serde(default = "default_platform_base")]
    pub api_base: String,
    /// Communities searched concurrently, one task each.
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
    /// Wall-clock budget per source task; a source over budget is abandoned.
    #[serde(default = "default_source_timeout")]
    pub per_source_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        CollectorConfig {
            api_base: default_platform_base(),
            sources: default_sources(),
            per_source_timeout_secs: default_source_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// OpenAI-compatible API root, e.g. `http://localhost:8100/v1`.
    #[serde(default = "default_embedding_base")]
    pub api_base: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Texts per call to the embedding collaborator.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Expected vector dimensionality; 0 means "accept whatever the first
    /// batch returns and hold the rest of the run to it".
    #[serde(default)]
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        EmbeddingConfig {
            api_base: default_embedding_base(),
            model: default_embedding_model(),
            batch_size: default_batch_size(),
            dimension: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericConfig {
    /// Root of the numeric sidecar serving `/reduce` and `/cluster`.
    #[serde(default = "default_numeric_base")]
    pub api_base: String,
}

impl Default for NumericConfig {
    fn default() -> Self {
        NumericConfig {
            api_base: default_numeric_base(),
        }
    }
}

fn default_platform_base() -> String {
    "https://www.reddit.com".to_string()
}

fn default_sources() -> Vec<String> {
    [
        "NeutralPolitics",
        "unpopularopinion",
        "changemyview",
        "Ask_Politics",
        "AskReddit",
        "PoliticalDiscussion",
        "TrueAskReddit",
        "NoStupidQuestions",
        "OutOfTheLoop",
        "CasualConversation",
        "worldnews",
        "explainlikeimfive",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_source_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("opinion_map/{}", env!("CARGO_PKG_VERSION"))
}

fn default_embedding_base() -> String {
    "http://localhost:8100/v1".to_string()
}

fn default_embedding_model() -> String {
    "all-MiniLM-L6-v2".to_string()
}

fn default_batch_size() -> usize {
    32
}

fn default_numeric_base() -> String {
    "http://localhost:8200".to_string()
}

impl Config {
    /// Loads and validates a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let cfg: Config = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Resolves the effective config: explicit path, else `OPINION_MAP_CONFIG`,
    /// else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(p) = explicit {
            return Self::load(p);
        }
        if let Ok(p) = std::env::var("OPINION_MAP_CONFIG") {
            return Self::load(&p);
        }
        Ok(Config::default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collector.sources.len() < MIN_SOURCES {
            return Err(ConfigError::Invalid(format!(
                "collector.sources needs at least {} communities, got {}",
                MIN_SOURCES,
                self.collector.sources.len()
            )));
        }
        if self.collector.per_source_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "collector.per_source_timeout_secs must be positive".into(),
            ));
        }
        if self.embedding.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "embedding.batch_size must be positive".into(),
            ));
        }
        for (field, value) in [
            ("collector.api_base", &self.collector.api_base),
            ("embedding.api_base", &self.embedding.api_base),
            ("numeric.api_base", &self.numeric.api_base),
        ] {
            Url::parse(value)
                .map_err(|e| ConfigError::Invalid(format!("{} is not a URL: {}", field, e)))?;
        }
        Ok(())
    }
}
