//! CLI entry point for service request triage.
//!
//! The binary owns the request store for the duration of one command:
//! it loads the store file, applies the command, and saves the file again
//! when the command changed anything.

mod cli;
mod config;
mod output;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use triage_core::{Classifier, NewRequest, SystemClock, WorkflowTracker};
use triage_store::{RequestFilter, RequestStore, load_seeds};

use crate::cli::{Cli, Commands};
use crate::config::TriageConfig;

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(if cli.verbose { "debug" } else { "info" });

    let mut config = TriageConfig::load(&cli.config)?;
    config.apply_env();
    if let Some(path) = &cli.store {
        config.store.path = path.clone();
    }

    let classifier = Classifier::new(config.rule_table()?);
    let store_path = config.store.path.as_path();

    match cli.command {
        Commands::Classify {
            summary,
            description,
        } => cmd_classify(&classifier, &summary, &description),
        Commands::Create {
            channel,
            requester,
            summary,
            description,
        } => {
            let new = NewRequest {
                channel,
                requester_type: requester,
                summary,
                description,
            };
            cmd_create(store_path, &classifier, new)
        }
        Commands::Advance { id } => cmd_advance(store_path, id),
        Commands::List { department, status } => {
            cmd_list(store_path, RequestFilter { department, status })
        }
        Commands::Show { id } => cmd_show(store_path, id),
        Commands::Stats => cmd_stats(store_path),
        Commands::Seed { file } => cmd_seed(store_path, &classifier, &file),
        Commands::Rules => {
            println!("{}", output::rules(classifier.table()));
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn open_store(path: &Path) -> Result<RequestStore> {
    RequestStore::open(path)
        .with_context(|| format!("failed to open request store {}", path.display()))
}

fn save_store(store: &RequestStore, path: &Path) -> Result<()> {
    store
        .save(path)
        .with_context(|| format!("failed to save request store {}", path.display()))
}

fn cmd_classify(classifier: &Classifier, summary: &str, description: &str) -> Result<()> {
    let classification = classifier.classify(summary, description);
    println!("{}", output::classification(&classification));
    Ok(())
}

fn cmd_create(path: &Path, classifier: &Classifier, new: NewRequest) -> Result<()> {
    if new.summary.trim().is_empty() || new.description.trim().is_empty() {
        anyhow::bail!("both summary and description must be filled in");
    }

    let mut store = open_store(path)?;
    let detail = output::request_detail(store.create(new, classifier, &SystemClock)?);
    save_store(&store, path)?;

    println!("{detail}");
    Ok(())
}

fn cmd_advance(path: &Path, id: u64) -> Result<()> {
    let mut store = open_store(path)?;
    let (outcome, _) = store.advance(id, &WorkflowTracker::new())?;
    save_store(&store, path)?;

    println!("{}", output::advance_outcome(id, outcome));
    Ok(())
}

fn cmd_list(path: &Path, filter: RequestFilter) -> Result<()> {
    let store = open_store(path)?;
    let matches = store.filter(&filter);
    if matches.is_empty() {
        println!("No requests match the current filters.");
        return Ok(());
    }
    for req in matches {
        println!("{}", output::request_line(req));
    }
    Ok(())
}

fn cmd_show(path: &Path, id: u64) -> Result<()> {
    let store = open_store(path)?;
    let req = store
        .get(id)
        .with_context(|| format!("request #{id} not found"))?;
    println!("{}", output::request_detail(req));
    Ok(())
}

fn cmd_stats(path: &Path) -> Result<()> {
    let store = open_store(path)?;
    println!("Total requests: {}\n", store.len());
    println!("{}", output::counts("By status", &store.status_counts()));
    println!("{}", output::counts("By priority", &store.priority_counts()));
    print!("{}", output::counts("By department", &store.department_counts()));
    Ok(())
}

fn cmd_seed(path: &Path, classifier: &Classifier, file: &Path) -> Result<()> {
    let seeds = load_seeds(file)
        .with_context(|| format!("failed to read seed file {}", file.display()))?;

    let mut store = open_store(path)?;
    let added = store.import(seeds, classifier, &SystemClock)?;
    save_store(&store, path)?;

    info!(added, total = store.len(), "store seeded");
    println!("Imported {added} request(s) into {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber, writing to stderr so command output on
/// stdout stays clean.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
