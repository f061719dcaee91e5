//! Console rendering of ranked match lists

use crate::processing::fit_scorer::ScoreBreakdown;
use crate::processing::records::{MatchResult, SemanticMatch};
use colored::Colorize;

/// Console formatter with optional colors and per-employee detail
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self {
            use_colors,
            detailed,
        }
    }

    fn paint_score(&self, score: u32) -> String {
        let text = format!("{:>3}", score);
        if !self.use_colors {
            return text;
        }
        match score {
            70..=100 => text.green().bold().to_string(),
            40..=69 => text.yellow().to_string(),
            _ => text.red().to_string(),
        }
    }

    /// Render the top `limit` deterministic matches
    pub fn format_matches(&self, ranked: &[(MatchResult, ScoreBreakdown)], limit: usize) -> String {
        if ranked.is_empty() {
            return "No employees matched the required roles.\n".to_string();
        }

        let mut out = format!("Shortlisted {} employees:\n", ranked.len());
        for (i, (result, breakdown)) in ranked.iter().take(limit).enumerate() {
            out.push_str(&format!(
                "  {}. [{}] {} <{}> - {} ({})\n",
                i + 1,
                self.paint_score(result.fit_score),
                result.name,
                result.email,
                result.role,
                result.employee_id
            ));

            if self.detailed {
                out.push_str(&format!(
                    "       skill coverage {:.0}%, role bonus {}\n",
                    breakdown.skill_score * 100.0,
                    if breakdown.role_match { "yes" } else { "no" }
                ));
                if !breakdown.matched_skills.is_empty() {
                    out.push_str(&format!(
                        "       matched: {}\n",
                        breakdown.matched_skills.join(", ")
                    ));
                }
                if !breakdown.missing_skills.is_empty() {
                    out.push_str(&format!(
                        "       missing: {}\n",
                        breakdown.missing_skills.join(", ")
                    ));
                }
            }
        }

        if ranked.len() > limit {
            out.push_str(&format!("  ... and {} more\n", ranked.len() - limit));
        }
        out
    }

    pub fn format_semantic(&self, matches: &[SemanticMatch]) -> String {
        if matches.is_empty() {
            return "No semantic matches found.\n".to_string();
        }

        let mut out = format!("Top {} semantic matches:\n", matches.len());
        for (i, m) in matches.iter().enumerate() {
            let score = format!("{:.4}", m.similarity_score);
            let score = if self.use_colors { score.cyan().to_string() } else { score };
            out.push_str(&format!(
                "  {}. {} ({}) | score: {}\n",
                i + 1,
                m.name,
                m.email,
                score
            ));
        }
        out
    }
}
