//! Bench matcher: rank bench employees for incoming project requirements

use bench_matcher::cli::{self, Cli, Commands, ConfigAction};
use bench_matcher::output::formatter::ConsoleFormatter;
use bench_matcher::processing::embeddings;
use bench_matcher::processing::fit_scorer::FitScorer;
use bench_matcher::processing::semantic_matcher::ProjectSelector;
use bench_matcher::processing::vector_store::VectorStore;
use bench_matcher::{pipeline, BenchMatcherError, Config, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Load configuration
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Execute command
    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn check_json(path: &Path, label: &str) -> Result<()> {
    cli::validate_file_extension(path, &["json"])
        .map_err(|e| BenchMatcherError::InvalidInput(format!("{}: {}", label, e)))
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed}]") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

async fn run_command(
    command: Commands,
    config: Config,
    config_file: Option<PathBuf>,
) -> Result<()> {
    match command {
        Commands::Match {
            roster,
            requirement,
            output,
            detailed,
            show,
        } => {
            let roster = roster.unwrap_or_else(|| config.paths.roster.clone());
            let requirement = requirement.unwrap_or_else(|| config.paths.requirement.clone());
            let output = output.unwrap_or_else(|| config.paths.matches_output.clone());
            check_json(&roster, "Roster file")?;
            check_json(&requirement, "Requirement file")?;

            info!("Starting fit-score matching");
            let scorer = FitScorer::from_config(&config.matching);
            let ranked = pipeline::run_fit_match(&scorer, &roster, &requirement, &output)?;

            let formatter = ConsoleFormatter::new(true, detailed);
            print!("{}", formatter.format_matches(&ranked, show));
            println!("Matches saved to {}", output.display());
        }

        Commands::Index { roster, requirement } => {
            let roster = roster.unwrap_or_else(|| config.paths.roster.clone());
            let requirement = requirement.unwrap_or_else(|| config.paths.requirement.clone());
            check_json(&roster, "Roster file")?;
            check_json(&requirement, "Requirement file")?;

            let embedder = embeddings::from_config(&config.embeddings)?;
            let store = VectorStore::new(config.paths.vectorstore_dir.clone(), embedder);

            let bar = spinner("Embedding employees and project");
            let summary = pipeline::build_indexes(&store, &roster, &requirement).await;
            bar.finish_and_clear();
            let summary = summary?;

            println!(
                "Indexed {} employees and {} project into {}",
                summary.employees,
                summary.projects,
                store.root().display()
            );
        }

        Commands::Semantic {
            project,
            top_n,
            output,
        } => {
            let top_n = cli::parse_top_n(top_n.unwrap_or(config.matching.default_top_n))
                .map_err(BenchMatcherError::InvalidInput)?;
            let output = output.unwrap_or_else(|| config.paths.semantic_output.clone());

            info!("Starting semantic matching");
            let embedder = embeddings::from_config(&config.embeddings)?;
            let store = VectorStore::new(config.paths.vectorstore_dir.clone(), embedder);

            let bar = spinner("Searching employee index");
            let selector = ProjectSelector::from(project);
            let matches = pipeline::run_semantic_match(&store, &selector, top_n, &output).await;
            bar.finish_and_clear();
            let matches = matches?;

            let formatter = ConsoleFormatter::new(true, false);
            print!("{}", formatter.format_semantic(&matches));
            println!("Matches saved to {}", output.display());
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let rendered = toml::to_string_pretty(&config)?;
                println!("{}", rendered);
            }

            Some(ConfigAction::Reset) => {
                let path = Config::resolve_path(config_file.as_deref());
                Config::default().save_to(&path)?;
                println!("Configuration reset to defaults at {}", path.display());
            }

            Some(ConfigAction::Path) => {
                println!("{}", Config::resolve_path(config_file.as_deref()).display());
            }
        },
    }

    Ok(())
}
