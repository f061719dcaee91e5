//! Semantic employee matching over the persisted vector collections

use crate::error::{BenchMatcherError, Result};
use crate::processing::records::SemanticMatch;
use crate::processing::vector_store::{
    Collection, SearchHit, StoredDocument, VectorStore, EMPLOYEE_INDEX, PROJECT_INDEX,
};
use serde_json::{Map, Value};

const MISSING_FIELD: &str = "N/A";

/// Which project document to use as the query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectSelector {
    /// The only document in the project collection; more than one is an error
    Sole,
    /// The document with this id (the project name)
    Id(String),
}

impl From<Option<String>> for ProjectSelector {
    fn from(id: Option<String>) -> Self {
        match id {
            Some(id) => ProjectSelector::Id(id),
            None => ProjectSelector::Sole,
        }
    }
}

pub struct SemanticMatcher<'a> {
    store: &'a VectorStore,
}

impl<'a> SemanticMatcher<'a> {
    pub fn new(store: &'a VectorStore) -> Self {
        Self { store }
    }

    /// Rank indexed employees by similarity to the selected project document
    pub async fn semantic_match(
        &self,
        project: &ProjectSelector,
        top_n: usize,
    ) -> Result<Vec<SemanticMatch>> {
        if top_n == 0 {
            return Err(BenchMatcherError::InvalidInput(
                "top_n must be a positive integer".to_string(),
            ));
        }

        let projects = self.store.load(PROJECT_INDEX)?;
        let query = select_project(&projects, project)?;
        log::debug!("Project context: {}", query.text);

        let employees = self.store.load(EMPLOYEE_INDEX)?;
        let hits = self.store.search(&employees, &query.text, top_n).await?;

        log::info!(
            "Retrieved {} semantic matches for project '{}'",
            hits.len(),
            query.id
        );
        Ok(hits.iter().map(to_semantic_match).collect())
    }

    /// Rank indexed employees against free query text
    pub async fn match_text(&self, query: &str, top_n: usize) -> Result<Vec<SemanticMatch>> {
        if top_n == 0 {
            return Err(BenchMatcherError::InvalidInput(
                "top_n must be a positive integer".to_string(),
            ));
        }

        let employees = self.store.load(EMPLOYEE_INDEX)?;
        let hits = self.store.search(&employees, query, top_n).await?;
        Ok(hits.iter().map(to_semantic_match).collect())
    }
}

fn select_project<'c>(
    projects: &'c Collection,
    selector: &ProjectSelector,
) -> Result<&'c StoredDocument> {
    if projects.is_empty() {
        return Err(BenchMatcherError::EmptyIndex(projects.name.clone()));
    }

    match selector {
        ProjectSelector::Sole => match projects.documents.as_slice() {
            [only] => Ok(only),
            docs => Err(BenchMatcherError::AmbiguousProject {
                collection: projects.name.clone(),
                count: docs.len(),
            }),
        },
        ProjectSelector::Id(id) => {
            projects
                .get(id)
                .ok_or_else(|| BenchMatcherError::DocumentNotFound {
                    collection: projects.name.clone(),
                    id: id.clone(),
                })
        }
    }
}

fn metadata_str(metadata: &Map<String, Value>, key: &str) -> String {
    metadata
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(MISSING_FIELD)
        .to_string()
}

fn to_semantic_match(hit: &SearchHit) -> SemanticMatch {
    SemanticMatch {
        employee_id: metadata_str(&hit.metadata, "id"),
        name: metadata_str(&hit.metadata, "name"),
        email: metadata_str(&hit.metadata, "email"),
        similarity_score: round4(hit.score as f64),
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::embeddings::HashingEmbedder;
    use crate::processing::records::{EmployeeRecord, IndexDocument, ProjectRequirement};
    use tempfile::TempDir;

    fn employee(id: &str, name: &str, role: &str, skills: &[&str]) -> IndexDocument {
        EmployeeRecord {
            employee_id: id.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            email: format!("{}@example.com", id.to_lowercase()),
            skills: skills.iter().map(|s| s.to_string()).collect(),
        }
        .to_index_document()
    }

    fn project(name: &str, skills: &[&str]) -> IndexDocument {
        ProjectRequirement {
            project_name: name.to_string(),
            summary: "Internal platform".to_string(),
            required_roles: vec!["Backend Developer".to_string()],
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            domain: "Platform".to_string(),
        }
        .to_index_document()
    }

    async fn seeded_store(dir: &TempDir) -> VectorStore {
        let store = VectorStore::new(dir.path(), Box::new(HashingEmbedder::new(256)));
        store
            .build(
                EMPLOYEE_INDEX,
                &[
                    employee("E1", "Mira", "Designer", &["Figma", "Illustrator"]),
                    employee("E2", "Tom", "Backend Developer", &["Rust", "Postgres", "Kafka"]),
                ],
            )
            .await
            .unwrap();
        store
            .build(PROJECT_INDEX, &[project("Ledger", &["Rust", "Postgres", "Kafka"])])
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_top_n_larger_than_index_returns_all() {
        let temp_dir = TempDir::new().unwrap();
        let store = seeded_store(&temp_dir).await;
        let matcher = SemanticMatcher::new(&store);

        let matches = matcher.semantic_match(&ProjectSelector::Sole, 3).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].employee_id, "E2");
        assert_eq!(matches[0].name, "Tom");
        assert_eq!(matches[0].email, "e2@example.com");
        assert!(matches[0].similarity_score >= matches[1].similarity_score);
    }

    #[tokio::test]
    async fn test_scores_rounded_to_four_places() {
        let temp_dir = TempDir::new().unwrap();
        let store = seeded_store(&temp_dir).await;
        let matches = SemanticMatcher::new(&store)
            .semantic_match(&ProjectSelector::Id("Ledger".to_string()), 5)
            .await
            .unwrap();

        for m in matches {
            assert_eq!(m.similarity_score, round4(m.similarity_score));
        }
    }

    #[tokio::test]
    async fn test_project_selection_errors() {
        let temp_dir = TempDir::new().unwrap();
        let store = seeded_store(&temp_dir).await;
        let matcher = SemanticMatcher::new(&store);

        let missing = matcher
            .semantic_match(&ProjectSelector::Id("Unknown".to_string()), 2)
            .await;
        assert!(matches!(missing, Err(BenchMatcherError::DocumentNotFound { .. })));

        store
            .build(PROJECT_INDEX, &[project("A", &["Go"]), project("B", &["Java"])])
            .await
            .unwrap();
        let ambiguous = matcher.semantic_match(&ProjectSelector::Sole, 2).await;
        assert!(matches!(
            ambiguous,
            Err(BenchMatcherError::AmbiguousProject { count: 2, .. })
        ));

        let picked = matcher
            .semantic_match(&ProjectSelector::Id("B".to_string()), 2)
            .await
            .unwrap();
        assert_eq!(picked.len(), 2);

        store.build(PROJECT_INDEX, &[]).await.unwrap();
        let empty = matcher.semantic_match(&ProjectSelector::Sole, 2).await;
        assert!(matches!(empty, Err(BenchMatcherError::EmptyIndex(_))));
    }

    #[tokio::test]
    async fn test_missing_collections_are_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = VectorStore::new(temp_dir.path(), Box::new(HashingEmbedder::new(32)));
        let result = SemanticMatcher::new(&store)
            .semantic_match(&ProjectSelector::Sole, 1)
            .await;
        assert!(matches!(result, Err(BenchMatcherError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_zero_top_n_is_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let store = seeded_store(&temp_dir).await;
        let result = SemanticMatcher::new(&store).match_text("rust", 0).await;
        assert!(matches!(result, Err(BenchMatcherError::InvalidInput(_))));
    }

    #[test]
    fn test_missing_metadata_fields_fall_back() {
        let hit = SearchHit {
            id: "x".to_string(),
            text: "Name: X".to_string(),
            metadata: Map::new(),
            score: 0.123456,
        };
        let m = to_semantic_match(&hit);
        assert_eq!(m.employee_id, "N/A");
        assert_eq!(m.name, "N/A");
        assert_eq!(m.similarity_score, 0.1235);
    }
}
