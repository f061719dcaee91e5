//! Embedding providers: an OpenAI-compatible HTTP client and an offline
//! feature-hashing embedder

use crate::config::{EmbeddingConfig, EmbeddingProvider};
use crate::error::{BenchMatcherError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};
use unicode_segmentation::UnicodeSegmentation;

/// Fixed keys keep hashed embeddings stable across runs and Rust versions.
/// Changing them invalidates every persisted hashing collection.
const HASH_KEY_0: u64 = 0x0123_4567_89ab_cdef;
const HASH_KEY_1: u64 = 0xfedc_ba98_7654_3210;

const DEFAULT_BACKOFF_MS: u64 = 500;
const MAX_BACKOFF_MS: u64 = 30_000;

/// Turns texts into vectors, one per input, in input order
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier recorded alongside built collections
    fn name(&self) -> &str;

    /// Vector length, when known before the first call
    fn dimension(&self) -> Option<usize>;

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| BenchMatcherError::Embedding("Provider returned no vector".to_string()))
    }
}

/// Build the embedder selected by the configuration
pub fn from_config(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    match config.provider {
        EmbeddingProvider::OpenAi => Ok(Box::new(OpenAiEmbedder::new(config)?)),
        EmbeddingProvider::Hashing => Ok(Box::new(HashingEmbedder::new(config.dimension))),
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Client for any OpenAI-compatible `/embeddings` endpoint (OpenAI, OpenRouter, ...)
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    batch_size: usize,
    /// Retries after the first attempt
    max_retries: u32,
    backoff_ms: u64,
}

impl OpenAiEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &EmbeddingConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            batch_size: config.batch_size.max(1),
            max_retries: config.max_retries,
            backoff_ms: DEFAULT_BACKOFF_MS,
        })
    }

    /// Base delay before the first retry; doubles per retry up to 30s
    pub fn with_backoff(mut self, base: Duration) -> Self {
        self.backoff_ms = base.as_millis() as u64;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn retry_delay(&self, retry: u32) -> Duration {
        let factor = 1u64.checked_shl(retry.saturating_sub(1)).unwrap_or(u64::MAX);
        Duration::from_millis(self.backoff_ms.saturating_mul(factor).min(MAX_BACKOFF_MS))
    }

    /// One request, retried on 429, 5xx and transport errors with exponential backoff
    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: batch,
        };
        let mut last_error: Option<BenchMatcherError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.retry_delay(attempt);
                log::warn!(
                    "Embedding request attempt {} failed, retrying after {}ms",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    last_error = Some(e.into());
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                last_error = Some(BenchMatcherError::Network(format!(
                    "Embedding API returned {}: {}",
                    status, body
                )));
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(BenchMatcherError::Embedding(format!(
                    "Embedding API returned {}: {}",
                    status, message
                )));
            }

            let parsed: EmbeddingResponse = response.json().await?;
            return order_response(parsed, batch.len());
        }

        Err(last_error.unwrap_or_else(|| {
            BenchMatcherError::Network(format!(
                "Embedding request failed after {} attempts",
                self.max_retries + 1
            ))
        }))
    }
}

/// Put response items back in request order.
///
/// The indices must be exactly `0..expected`.
fn order_response(mut response: EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
    if response.data.len() != expected {
        return Err(BenchMatcherError::Embedding(format!(
            "Expected {} embeddings, provider returned {}",
            expected,
            response.data.len()
        )));
    }
    response.data.sort_by_key(|item| item.index);
    if let Some((position, item)) = response
        .data
        .iter()
        .enumerate()
        .find(|(position, item)| item.index != *position)
    {
        return Err(BenchMatcherError::Embedding(format!(
            "Provider returned index {} where {} was expected",
            item.index, position
        )));
    }
    Ok(response.data.into_iter().map(|item| item.embedding).collect())
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> Option<usize> {
        None
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start_time = Instant::now();
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            vectors.extend(self.embed_batch(batch).await?);
        }

        log::debug!(
            "Embedded {} texts with {} in {:.2?}",
            texts.len(),
            self.model,
            start_time.elapsed()
        );
        Ok(vectors)
    }
}

/// Deterministic bag-of-words embedder using signed feature hashing.
///
/// Needs no network or model files, so it suits offline runs and tests.
/// Texts sharing words land near each other; identical texts map to
/// identical unit vectors.
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash(&self, token: &str, salt: u8) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_KEY_0, HASH_KEY_1);
        salt.hash(&mut hasher);
        token.hash(&mut hasher);
        hasher.finish()
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        let lowered = text.to_lowercase();

        for word in lowered.unicode_words() {
            let idx = (self.hash(word, 0) % self.dimension as u64) as usize;
            let sign = if self.hash(word, 1) % 2 == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "feature-hash"
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dimension)
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

/// Memoizes vectors by text so repeated documents are embedded once
pub struct EmbeddingCache<'a> {
    inner: &'a dyn Embedder,
    cache: HashMap<String, Vec<f32>>,
    hits: usize,
    misses: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub cache_size: usize,
    pub hits: usize,
    pub misses: usize,
}

impl<'a> EmbeddingCache<'a> {
    pub fn new(inner: &'a dyn Embedder) -> Self {
        Self {
            inner,
            cache: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Embed `texts`, only sending uncached (and de-duplicated) texts to the provider
    pub async fn embed(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut uncached: Vec<String> = Vec::new();
        for text in texts {
            if self.cache.contains_key(text) || uncached.contains(text) {
                self.hits += 1;
            } else {
                uncached.push(text.clone());
            }
        }

        if !uncached.is_empty() {
            let vectors = self.inner.embed(&uncached).await?;
            if vectors.len() != uncached.len() {
                return Err(BenchMatcherError::Embedding(format!(
                    "Expected {} embeddings, provider returned {}",
                    uncached.len(),
                    vectors.len()
                )));
            }
            self.misses += uncached.len();
            self.cache.extend(uncached.into_iter().zip(vectors));
        }

        texts
            .iter()
            .map(|text| {
                self.cache.get(text).cloned().ok_or_else(|| {
                    BenchMatcherError::Embedding(format!("No embedding cached for '{}'", text))
                })
            })
            .collect()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            cache_size: self.cache.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

/// Cosine similarity between two vectors of equal length; zero vectors score 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(BenchMatcherError::Embedding(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot_product / (norm_a * norm_b))
    }
}
