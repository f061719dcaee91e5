//! Error handling for the bench matcher

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchMatcherError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing input file: {0}")]
    MissingInput(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Vector collection not found: {0}")]
    NotFound(String),

    #[error("Vector collection is empty: {0}")]
    EmptyIndex(String),

    #[error("Collection '{collection}' holds {count} documents; pass a project id to pick one")]
    AmbiguousProject { collection: String, count: usize },

    #[error("Document '{id}' not found in collection '{collection}'")]
    DocumentNotFound { collection: String, id: String },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, BenchMatcherError>;

/// Convert HTTP transport errors to our custom error type
impl From<reqwest::Error> for BenchMatcherError {
    fn from(err: reqwest::Error) -> Self {
        BenchMatcherError::Network(err.to_string())
    }
}

impl From<toml::de::Error> for BenchMatcherError {
    fn from(err: toml::de::Error) -> Self {
        BenchMatcherError::Configuration(format!("Failed to parse config: {}", err))
    }
}

impl From<toml::ser::Error> for BenchMatcherError {
    fn from(err: toml::ser::Error) -> Self {
        BenchMatcherError::Configuration(format!("Failed to serialize config: {}", err))
    }
}
