//! Loading of roster and requirement JSON files

use crate::error::{BenchMatcherError, Result};
use crate::processing::records::{EmployeeRecord, ProjectRequirement};
use log::info;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::Path;

pub struct InputManager;

impl InputManager {
    /// Load the employee roster (a JSON array of employee records)
    pub fn load_roster(path: &Path) -> Result<Vec<EmployeeRecord>> {
        let roster: Vec<EmployeeRecord> = Self::load_json(path)?;

        let mut seen = HashSet::new();
        for employee in &roster {
            if !seen.insert(employee.employee_id.as_str()) {
                return Err(BenchMatcherError::MalformedInput(format!(
                    "Duplicate employee_id '{}' in {}",
                    employee.employee_id,
                    path.display()
                )));
            }
        }

        info!("Loaded {} employees from {}", roster.len(), path.display());
        Ok(roster)
    }

    /// Load the analyzed project requirement (a JSON object)
    pub fn load_requirement(path: &Path) -> Result<ProjectRequirement> {
        let requirement: ProjectRequirement = Self::load_json(path)?;
        info!(
            "Loaded requirement '{}' ({} roles, {} skills) from {}",
            requirement.project_name,
            requirement.required_roles.len(),
            requirement.required_skills.len(),
            path.display()
        );
        Ok(requirement)
    }

    fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
        if !path.exists() {
            return Err(BenchMatcherError::MissingInput(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            BenchMatcherError::MalformedInput(format!("{}: {}", path.display(), e))
        })
    }
}
