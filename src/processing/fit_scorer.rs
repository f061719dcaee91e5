//! Deterministic fit scoring of bench employees against a project requirement

use crate::config::MatchingConfig;
use crate::error::{BenchMatcherError, Result};
use crate::processing::records::{EmployeeRecord, MatchResult, ProjectRequirement};
use crate::processing::similarity::is_similar;
use serde::{Deserialize, Serialize};

/// Fit scorer combining a role filter, a role bonus and skill coverage
pub struct FitScorer {
    similarity_threshold: f64,
    skill_weight: f64,
    role_bonus: f64,
}

/// Per-employee explanation of a fit score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub employee_id: String,
    /// Fraction of required skills covered, in `[0, 1]`
    pub skill_score: f64,
    pub role_match: bool,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub fit_score: u32,
}

impl Default for FitScorer {
    fn default() -> Self {
        Self::from_config(&MatchingConfig::default())
    }
}

impl FitScorer {
    pub fn new(similarity_threshold: f64, skill_weight: f64, role_bonus: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&similarity_threshold) || !(0.0..=1.0).contains(&skill_weight) {
            return Err(BenchMatcherError::Configuration(format!(
                "Threshold and skill weight must be within [0, 1], got {} and {}",
                similarity_threshold, skill_weight
            )));
        }
        if !(0.0..=100.0).contains(&role_bonus) {
            return Err(BenchMatcherError::Configuration(format!(
                "Role bonus must be within [0, 100], got {}",
                role_bonus
            )));
        }

        Ok(Self {
            similarity_threshold,
            skill_weight,
            role_bonus,
        })
    }

    /// Build from an already validated matching config
    pub fn from_config(config: &MatchingConfig) -> Self {
        Self {
            similarity_threshold: config.similarity_threshold,
            skill_weight: config.skill_weight,
            role_bonus: config.role_bonus,
        }
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    /// Whether the employee's role is one of the required roles (case-insensitive exact)
    pub fn passes_role_filter(
        &self,
        requirement: &ProjectRequirement,
        employee: &EmployeeRecord,
    ) -> bool {
        let role = employee.role.to_lowercase();
        requirement
            .required_roles
            .iter()
            .any(|required| required.to_lowercase() == role)
    }

    /// Score a single employee without applying the role filter
    pub fn score_employee(
        &self,
        requirement: &ProjectRequirement,
        employee: &EmployeeRecord,
    ) -> ScoreBreakdown {
        let role_match = requirement
            .required_roles
            .iter()
            .any(|required| is_similar(&employee.role, required, self.similarity_threshold));

        let (matched_skills, missing_skills): (Vec<String>, Vec<String>) = requirement
            .required_skills
            .iter()
            .cloned()
            .partition(|required| {
                employee
                    .skills
                    .iter()
                    .any(|skill| is_similar(required, skill, self.similarity_threshold))
            });

        // No required skills means no coverage to reward.
        let skill_score = if requirement.required_skills.is_empty() {
            0.0
        } else {
            matched_skills.len() as f64 / requirement.required_skills.len() as f64
        };

        let bonus = if role_match { self.role_bonus } else { 0.0 };
        let raw = skill_score * 100.0 * self.skill_weight + bonus;
        let fit_score = raw.round().clamp(0.0, 100.0) as u32;

        ScoreBreakdown {
            employee_id: employee.employee_id.clone(),
            skill_score,
            role_match,
            matched_skills,
            missing_skills,
            fit_score,
        }
    }

    /// Filter, score and rank the roster, best fit first.
    ///
    /// Ties keep roster order.
    pub fn rank(
        &self,
        requirement: &ProjectRequirement,
        roster: &[EmployeeRecord],
    ) -> Vec<MatchResult> {
        self.rank_with_breakdown(requirement, roster)
            .into_iter()
            .map(|(result, _)| result)
            .collect()
    }

    /// Same ordering as [`FitScorer::rank`], paired with each score's breakdown
    pub fn rank_with_breakdown(
        &self,
        requirement: &ProjectRequirement,
        roster: &[EmployeeRecord],
    ) -> Vec<(MatchResult, ScoreBreakdown)> {
        let mut ranked: Vec<(MatchResult, ScoreBreakdown)> = roster
            .iter()
            .filter(|employee| self.passes_role_filter(requirement, employee))
            .map(|employee| {
                let breakdown = self.score_employee(requirement, employee);
                let result = MatchResult {
                    fit_score: breakdown.fit_score,
                    ..MatchResult::from(employee)
                };
                (result, breakdown)
            })
            .collect();

        // sort_by is stable
        ranked.sort_by(|a, b| b.0.fit_score.cmp(&a.0.fit_score));

        log::debug!(
            "Shortlisted {} of {} employees for roles [{}]",
            ranked.len(),
            roster.len(),
            requirement.required_roles.join(", ")
        );

        ranked
    }
}
