//! File-to-file entry points used by the CLI and by external orchestrators

use crate::error::Result;
use crate::input::InputManager;
use crate::output::writer::write_json;
use crate::processing::fit_scorer::{FitScorer, ScoreBreakdown};
use crate::processing::records::{IndexDocument, MatchResult, SemanticMatch};
use crate::processing::semantic_matcher::{ProjectSelector, SemanticMatcher};
use crate::processing::vector_store::{VectorStore, EMPLOYEE_INDEX, PROJECT_INDEX};
use log::info;
use std::path::Path;

/// Counts of documents written by [`build_indexes`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSummary {
    pub employees: usize,
    pub projects: usize,
}

/// Rank the roster against the requirement and write the match list to `output`.
///
/// Nothing is written unless both inputs load and parse.
pub fn run_fit_match(
    scorer: &FitScorer,
    roster_path: &Path,
    requirement_path: &Path,
    output: &Path,
) -> Result<Vec<(MatchResult, ScoreBreakdown)>> {
    let requirement = InputManager::load_requirement(requirement_path)?;
    let roster = InputManager::load_roster(roster_path)?;

    let ranked = scorer.rank_with_breakdown(&requirement, &roster);
    let results: Vec<&MatchResult> = ranked.iter().map(|(result, _)| result).collect();
    write_json(output, &results)?;

    info!(
        "Shortlisted {} employees for required project roles; saved to {}",
        ranked.len(),
        output.display()
    );
    Ok(ranked)
}

/// Rebuild both collections from the roster and the requirement.
///
/// Both collections are embedded before either is written, so a failed
/// embedding leaves the previous indexes in place.
pub async fn build_indexes(
    store: &VectorStore,
    roster_path: &Path,
    requirement_path: &Path,
) -> Result<IndexSummary> {
    let roster = InputManager::load_roster(roster_path)?;
    let requirement = InputManager::load_requirement(requirement_path)?;

    let employee_docs: Vec<IndexDocument> = roster.iter().map(|e| e.to_index_document()).collect();
    let employees = store.embed_collection(EMPLOYEE_INDEX, &employee_docs).await?;
    let projects = store
        .embed_collection(PROJECT_INDEX, &[requirement.to_index_document()])
        .await?;

    store.persist(&employees)?;
    store.persist(&projects)?;

    Ok(IndexSummary {
        employees: employees.len(),
        projects: projects.len(),
    })
}

/// Run the semantic matcher and write its results to `output`
pub async fn run_semantic_match(
    store: &VectorStore,
    project: &ProjectSelector,
    top_n: usize,
    output: &Path,
) -> Result<Vec<SemanticMatch>> {
    let matches = SemanticMatcher::new(store).semantic_match(project, top_n).await?;
    write_json(output, &matches)?;

    info!(
        "Top {} semantic matches saved to {}",
        matches.len(),
        output.display()
    );
    Ok(matches)
}
