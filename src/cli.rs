//! CLI interface for the bench matcher

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "bench-matcher")]
#[command(about = "Match bench employees to project requirements")]
#[command(long_about = "Rank bench employees for a project with deterministic role/skill fit scores and embedding-based semantic search")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank employees by deterministic fit score
    Match {
        /// Employee roster (JSON array)
        #[arg(short, long)]
        roster: Option<PathBuf>,

        /// Analyzed project requirement (JSON object)
        #[arg(short = 'q', long)]
        requirement: Option<PathBuf>,

        /// Where to write the match list
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show skill coverage for each employee
        #[arg(short, long)]
        detailed: bool,

        /// How many matches to print
        #[arg(long, default_value_t = 5)]
        show: usize,
    },

    /// Build the employee and project vector indexes
    Index {
        /// Employee roster (JSON array)
        #[arg(short, long)]
        roster: Option<PathBuf>,

        /// Analyzed project requirement (JSON object)
        #[arg(short = 'q', long)]
        requirement: Option<PathBuf>,
    },

    /// Rank employees by embedding similarity to the indexed project
    Semantic {
        /// Project id in the project index (defaults to its only document)
        #[arg(short, long)]
        project: Option<String>,

        /// Number of matches to retrieve
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// Where to write the match list
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

/// Validate a requested result count
pub fn parse_top_n(value: usize) -> Result<usize, String> {
    if value == 0 {
        Err("top-n must be a positive integer".to_string())
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension(Path::new("employees.json"), &["json"]).is_ok());
        assert!(validate_file_extension(Path::new("EMPLOYEES.JSON"), &["json"]).is_ok());
        assert!(validate_file_extension(Path::new("employees.csv"), &["json"]).is_err());
        assert!(validate_file_extension(Path::new("employees"), &["json"]).is_err());
    }

    #[test]
    fn test_parse_top_n() {
        assert_eq!(parse_top_n(3), Ok(3));
        assert!(parse_top_n(0).is_err());
    }

    #[test]
    fn test_semantic_command_parses() {
        let cli = Cli::try_parse_from([
            "bench-matcher",
            "semantic",
            "-n",
            "3",
            "--project",
            "Ledger",
        ])
        .unwrap();
        match cli.command {
            Commands::Semantic { project, top_n, .. } => {
                assert_eq!(project.as_deref(), Some("Ledger"));
                assert_eq!(top_n, Some(3));
            }
            _ => panic!("expected semantic command"),
        }
    }

    #[test]
    fn test_global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["bench-matcher", "match", "--detailed", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Match { detailed: true, .. }));
    }
}
