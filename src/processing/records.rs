//! Employee, project and match records shared by both matchers

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured project requirement produced by the external analysis step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRequirement {
    pub project_name: String,
    #[serde(default)]
    pub summary: String,
    pub required_roles: Vec<String>,
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub domain: String,
}

/// A bench employee as listed in the roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee_id: String,
    pub name: String,
    pub role: String,
    pub email: String,
    pub skills: Vec<String>,
}

/// Deterministic fit-score result for one employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub employee_id: String,
    pub name: String,
    pub role: String,
    pub email: String,
    pub skills: Vec<String>,
    pub fit_score: u32,
}

/// Embedding-similarity result for one employee; rank is the list position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticMatch {
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub similarity_score: f64,
}

/// Text plus structured metadata, ready to be embedded into a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub id: String,
    pub text: String,
    pub metadata: Map<String, Value>,
}

impl EmployeeRecord {
    /// Canonical embedding text. Index build and query must agree on it.
    pub fn embedding_text(&self) -> String {
        format!(
            "Name: {}, Role: {}, Skills: {}",
            self.name,
            self.role,
            self.skills.join(", ")
        )
    }

    pub fn to_index_document(&self) -> IndexDocument {
        let mut metadata = Map::new();
        metadata.insert("id".to_string(), Value::String(self.employee_id.clone()));
        metadata.insert("name".to_string(), Value::String(self.name.clone()));
        metadata.insert("role".to_string(), Value::String(self.role.clone()));
        metadata.insert("email".to_string(), Value::String(self.email.clone()));
        metadata.insert(
            "skills".to_string(),
            Value::Array(self.skills.iter().cloned().map(Value::String).collect()),
        );

        IndexDocument {
            id: self.employee_id.clone(),
            text: self.embedding_text(),
            metadata,
        }
    }
}

impl ProjectRequirement {
    /// Canonical embedding text. Index build and query must agree on it.
    pub fn embedding_text(&self) -> String {
        format!(
            "Project: {}, Summary: {}, Skills: {}",
            self.project_name,
            self.summary,
            self.required_skills.join(", ")
        )
    }

    pub fn to_index_document(&self) -> IndexDocument {
        let mut metadata = Map::new();
        metadata.insert("project".to_string(), Value::String(self.project_name.clone()));
        metadata.insert("domain".to_string(), Value::String(self.domain.clone()));

        IndexDocument {
            id: self.project_name.clone(),
            text: self.embedding_text(),
            metadata,
        }
    }
}

impl From<&EmployeeRecord> for MatchResult {
    fn from(employee: &EmployeeRecord) -> Self {
        Self {
            employee_id: employee.employee_id.clone(),
            name: employee.name.clone(),
            role: employee.role.clone(),
            email: employee.email.clone(),
            skills: employee.skills.clone(),
            fit_score: 0,
        }
    }
}
