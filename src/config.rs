//! Configuration management for the bench matcher

use crate::error::{BenchMatcherError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    pub matching: MatchingConfig,
    pub embeddings: EmbeddingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub roster: PathBuf,
    pub requirement: PathBuf,
    pub matches_output: PathBuf,
    pub semantic_output: PathBuf,
    pub vectorstore_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Strict lower bound a similarity ratio must exceed to count as a match
    pub similarity_threshold: f64,
    pub skill_weight: f64,
    pub role_bonus: f64,
    pub default_top_n: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// OpenAI-compatible `/embeddings` endpoint
    OpenAi,
    /// Offline feature-hashing embedder
    Hashing,
}

/// Everything an embedding client needs; passed explicitly to constructors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub dimension: usize,
    pub batch_size: usize,
    pub timeout_secs: u64,
    /// Retries after the first attempt; 0 sends each request once
    pub max_retries: u32,
}

/// Upper bound on `embeddings.max_retries`
pub const MAX_RETRIES_LIMIT: u32 = 10;

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.6,
            skill_weight: 0.7,
            role_bonus: 30.0,
            default_top_n: 5,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::OpenAi,
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "text-embedding-3-large".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            dimension: 256,
            batch_size: 64,
            timeout_secs: 60,
            max_retries: 3,
        }
    }
}

impl EmbeddingConfig {
    /// Offline configuration used by tests and air-gapped runs
    pub fn hashing(dimension: usize) -> Self {
        Self {
            provider: EmbeddingProvider::Hashing,
            model: "feature-hash".to_string(),
            dimension,
            ..Self::default()
        }
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(BenchMatcherError::Configuration(format!(
                "Missing API key: set the {} environment variable",
                self.api_key_env
            ))),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from("data");
        Self {
            roster: data_dir.join("employees").join("employees.json"),
            requirement: data_dir.join("projects").join("analysis_001.json"),
            matches_output: data_dir.join("projects").join("matches_001.json"),
            semantic_output: data_dir.join("projects").join("rag_matches_001.json"),
            vectorstore_dir: data_dir.join("vectorstores"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            matching: MatchingConfig::default(),
            embeddings: EmbeddingConfig::default(),
        }
    }
}

impl Config {
    /// Load from an explicit file, or from the default location.
    ///
    /// An explicit path must exist. The default location is seeded with
    /// defaults on first use.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(BenchMatcherError::Configuration(format!(
                        "Config file does not exist: {}",
                        path.display()
                    )));
                }
                Self::read_from(path)?
            }
            None => {
                let config_path = Self::config_path();
                if config_path.exists() {
                    Self::read_from(&config_path)?
                } else {
                    let config = Self::default();
                    config.save_to(&config_path)?;
                    config
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn read_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// The explicit `--config` file when given, the default location otherwise
    pub fn resolve_path(path: Option<&Path>) -> PathBuf {
        path.map(Path::to_path_buf).unwrap_or_else(Self::config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("bench-matcher")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        let m = &self.matching;
        if !(0.0..=1.0).contains(&m.similarity_threshold) {
            return Err(BenchMatcherError::Configuration(format!(
                "matching.similarity_threshold must be within [0, 1], got {}",
                m.similarity_threshold
            )));
        }
        if !(0.0..=1.0).contains(&m.skill_weight) {
            return Err(BenchMatcherError::Configuration(format!(
                "matching.skill_weight must be within [0, 1], got {}",
                m.skill_weight
            )));
        }
        if !(0.0..=100.0).contains(&m.role_bonus) {
            return Err(BenchMatcherError::Configuration(format!(
                "matching.role_bonus must be within [0, 100], got {}",
                m.role_bonus
            )));
        }
        if m.default_top_n == 0 {
            return Err(BenchMatcherError::Configuration(
                "matching.default_top_n must be at least 1".to_string(),
            ));
        }

        let e = &self.embeddings;
        if e.dimension == 0 || e.batch_size == 0 {
            return Err(BenchMatcherError::Configuration(
                "embeddings.dimension and embeddings.batch_size must be at least 1".to_string(),
            ));
        }
        if e.max_retries > MAX_RETRIES_LIMIT {
            return Err(BenchMatcherError::Configuration(format!(
                "embeddings.max_retries must be at most {}, got {}",
                MAX_RETRIES_LIMIT, e.max_retries
            )));
        }
        Ok(())
    }
}
