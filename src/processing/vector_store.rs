//! Persistent, file-backed vector collections with cosine-similarity search
//!
//! Each collection lives in `<root>/<name>/collection.json`. Scores are
//! cosine similarities: higher is better, and hits are returned in
//! descending score order.

use crate::error::{BenchMatcherError, Result};
use crate::output::writer::write_json;
use crate::processing::embeddings::{cosine_similarity, Embedder, EmbeddingCache};
use crate::processing::records::IndexDocument;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const EMPLOYEE_INDEX: &str = "employee_index";
pub const PROJECT_INDEX: &str = "project_index";

const COLLECTION_FILE: &str = "collection.json";

/// A document stored together with its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub text: String,
    pub metadata: Map<String, Value>,
    pub embedding: Vec<f32>,
}

/// A loaded collection, ready to be searched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    pub model: String,
    pub dimension: usize,
    pub built_at: DateTime<Utc>,
    pub documents: Vec<StoredDocument>,
}

/// One search result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub text: String,
    pub metadata: Map<String, Value>,
    pub score: f32,
}

impl Collection {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&StoredDocument> {
        self.documents.iter().find(|doc| doc.id == id)
    }
}

/// Adapter between matchers and the embedding provider plus on-disk collections
pub struct VectorStore {
    root: PathBuf,
    embedder: Box<dyn Embedder>,
}

impl VectorStore {
    pub fn new(root: impl Into<PathBuf>, embedder: Box<dyn Embedder>) -> Self {
        Self {
            root: root.into(),
            embedder,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    fn collection_path(&self, name: &str) -> Result<PathBuf> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(BenchMatcherError::InvalidInput(format!(
                "Invalid collection name: '{}'",
                name
            )));
        }
        Ok(self.root.join(name).join(COLLECTION_FILE))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.collection_path(name)
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Embed `documents` and persist them as `name`, replacing any previous build
    pub async fn build(&self, name: &str, documents: &[IndexDocument]) -> Result<Collection> {
        let collection = self.embed_collection(name, documents).await?;
        self.persist(&collection)?;
        Ok(collection)
    }

    /// Embed `documents` into an in-memory collection without touching disk
    pub async fn embed_collection(
        &self,
        name: &str,
        documents: &[IndexDocument],
    ) -> Result<Collection> {
        self.collection_path(name)?;

        let texts: Vec<String> = documents.iter().map(|doc| doc.text.clone()).collect();
        let mut cache = EmbeddingCache::new(self.embedder.as_ref());
        let embeddings = cache.embed(&texts).await?;

        let dimension = embeddings
            .first()
            .map(|v| v.len())
            .or_else(|| self.embedder.dimension())
            .unwrap_or(0);
        if let Some(bad) = embeddings.iter().find(|v| v.len() != dimension) {
            return Err(BenchMatcherError::Embedding(format!(
                "Inconsistent embedding dimensions in '{}': {} vs {}",
                name,
                dimension,
                bad.len()
            )));
        }

        let collection = Collection {
            name: name.to_string(),
            model: self.embedder.name().to_string(),
            dimension,
            built_at: Utc::now(),
            documents: documents
                .iter()
                .zip(embeddings)
                .map(|(doc, embedding)| StoredDocument {
                    id: doc.id.clone(),
                    text: doc.text.clone(),
                    metadata: doc.metadata.clone(),
                    embedding,
                })
                .collect(),
        };

        let stats = cache.stats();
        log::info!(
            "Embedded collection '{}' with {} documents ({} unique texts embedded)",
            name,
            collection.len(),
            stats.misses
        );
        Ok(collection)
    }

    /// Write `collection` under its name, atomically replacing any previous build
    pub fn persist(&self, collection: &Collection) -> Result<()> {
        let path = self.collection_path(&collection.name)?;
        write_json(&path, collection)?;
        log::info!(
            "Saved collection '{}' ({} documents) to {}",
            collection.name,
            collection.len(),
            path.display()
        );
        Ok(())
    }

    /// Load a previously built collection
    pub fn load(&self, name: &str) -> Result<Collection> {
        let path = self.collection_path(name)?;
        if !path.exists() {
            return Err(BenchMatcherError::NotFound(format!(
                "{} (expected at {})",
                name,
                path.display()
            )));
        }

        let content = std::fs::read_to_string(&path)?;
        let collection: Collection = serde_json::from_str(&content).map_err(|e| {
            BenchMatcherError::MalformedInput(format!(
                "Corrupt collection file {}: {}",
                path.display(),
                e
            ))
        })?;

        log::info!("Loaded collection '{}' ({} documents)", name, collection.len());
        Ok(collection)
    }

    /// Embed `query` and return the `top_n` most similar documents
    pub async fn search(
        &self,
        collection: &Collection,
        query: &str,
        top_n: usize,
    ) -> Result<Vec<SearchHit>> {
        if collection.is_empty() || top_n == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed_one(query).await?;
        search_by_vector(collection, &query_embedding, top_n)
    }
}

/// Rank `collection` against an already embedded query
pub fn search_by_vector(
    collection: &Collection,
    query: &[f32],
    top_n: usize,
) -> Result<Vec<SearchHit>> {
    if query.len() != collection.dimension && !collection.is_empty() {
        return Err(BenchMatcherError::Embedding(format!(
            "Query dimension {} does not match collection '{}' dimension {} (built with {})",
            query.len(),
            collection.name,
            collection.dimension,
            collection.model
        )));
    }

    let mut scored = collection
        .documents
        .iter()
        .map(|doc| -> Result<(&StoredDocument, f32)> {
            Ok((doc, cosine_similarity(query, &doc.embedding)?))
        })
        .collect::<Result<Vec<_>>>()?;

    // Stable sort: equal scores keep insertion order.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    Ok(scored
        .into_iter()
        .take(top_n)
        .map(|(doc, score)| SearchHit {
            id: doc.id.clone(),
            text: doc.text.clone(),
            metadata: doc.metadata.clone(),
            score,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::embeddings::HashingEmbedder;
    use tempfile::TempDir;

    fn doc(id: &str, text: &str) -> IndexDocument {
        IndexDocument {
            id: id.to_string(),
            text: text.to_string(),
            metadata: Map::new(),
        }
    }

    fn store(dir: &TempDir) -> VectorStore {
        VectorStore::new(dir.path(), Box::new(HashingEmbedder::new(128)))
    }

    #[tokio::test]
    async fn test_exact_text_query_ranks_first() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let docs = vec![
            doc("1", "Name: Ana, Role: Designer, Skills: Figma, Sketch"),
            doc("2", "Name: Bo, Role: Backend Developer, Skills: Rust, Postgres"),
            doc("3", "Name: Cy, Role: QA Engineer, Skills: Selenium"),
        ];
        store.build(EMPLOYEE_INDEX, &docs).await.unwrap();

        let collection = store.load(EMPLOYEE_INDEX).unwrap();
        let hits = store.search(&collection, &docs[1].text, 3).await.unwrap();
        assert_eq!(hits[0].id, "2");
        assert!((hits[0].score - 1.0).abs() < 1e-5);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_rebuild_replaces_collection() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store.build(PROJECT_INDEX, &[doc("a", "first"), doc("b", "second")]).await.unwrap();
        store.build(PROJECT_INDEX, &[doc("c", "third")]).await.unwrap();

        let collection = store.load(PROJECT_INDEX).unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.documents[0].id, "c");
    }

    #[tokio::test]
    async fn test_embed_collection_writes_nothing_until_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        let collection = store
            .embed_collection(PROJECT_INDEX, &[doc("a", "first")])
            .await
            .unwrap();
        assert!(!store.exists(PROJECT_INDEX));

        store.persist(&collection).unwrap();
        assert!(store.exists(PROJECT_INDEX));
        assert_eq!(store.load(PROJECT_INDEX).unwrap().documents[0].id, "a");
    }

    #[tokio::test]
    async fn test_load_missing_collection_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let result = store(&temp_dir).load(EMPLOYEE_INDEX);
        assert!(matches!(result, Err(BenchMatcherError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_search_empty_collection_returns_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        store.build(EMPLOYEE_INDEX, &[]).await.unwrap();

        let collection = store.load(EMPLOYEE_INDEX).unwrap();
        assert!(collection.is_empty());
        assert!(store.search(&collection, "anything", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_caps_at_top_n() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let docs: Vec<IndexDocument> = (0..5)
            .map(|i| doc(&i.to_string(), &format!("doc {}", i)))
            .collect();
        let collection = store.build(EMPLOYEE_INDEX, &docs).await.unwrap();

        assert_eq!(store.search(&collection, "doc 3", 2).await.unwrap().len(), 2);
        assert_eq!(store.search(&collection, "doc 3", 50).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_embedding_error() {
        let temp_dir = TempDir::new().unwrap();
        let collection = store(&temp_dir).build(EMPLOYEE_INDEX, &[doc("1", "rust")]).await.unwrap();

        let other = VectorStore::new(temp_dir.path(), Box::new(HashingEmbedder::new(16)));
        let result = other.search(&collection, "rust", 1).await;
        assert!(matches!(result, Err(BenchMatcherError::Embedding(_))));
    }

    #[test]
    fn test_invalid_collection_name_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let result = store(&temp_dir).load("../escape");
        assert!(matches!(result, Err(BenchMatcherError::InvalidInput(_))));
    }
}
