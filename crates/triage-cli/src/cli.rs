//! CLI argument definitions for the `triage` binary.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use triage_core::{Channel, Department, LifecycleState, RequesterType};

/// Service request triage -- keyword routing and lifecycle tracking.
#[derive(Parser)]
#[command(
    name = "triage",
    version,
    about = "Service request triage -- keyword routing and lifecycle tracking",
    long_about = "Classifies State & Local Government service requests by keyword, \
                  routes them to a department, and tracks them from NEW to CLOSED."
)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Override the request store file.
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify text without storing anything.
    Classify {
        /// Short summary of the request.
        #[arg(long, short)]
        summary: String,

        /// Detailed description.
        #[arg(long, short, default_value = "")]
        description: String,
    },

    /// Create a new request.
    Create {
        /// Submission channel: phone, email, walk-in, portal.
        #[arg(long, short)]
        channel: Channel,

        /// Requester type: resident or employee.
        #[arg(long, short)]
        requester: RequesterType,

        /// Short summary of the request.
        #[arg(long, short)]
        summary: String,

        /// Detailed description.
        #[arg(long, short)]
        description: String,
    },

    /// Advance a request to its next lifecycle state.
    Advance {
        /// Request id.
        id: u64,
    },

    /// List requests, optionally filtered.
    List {
        /// Only requests routed to this department.
        #[arg(long)]
        department: Option<Department>,

        /// Only requests in this lifecycle state.
        #[arg(long)]
        status: Option<LifecycleState>,
    },

    /// Show every field of one request.
    Show {
        /// Request id.
        id: u64,
    },

    /// Show request counts by status, priority and department.
    Stats,

    /// Import sample requests from a JSON file.
    Seed {
        /// Seed file (JSON array).
        #[arg(default_value = "data/sample_requests.json")]
        file: PathBuf,
    },

    /// Print the active classification rules.
    Rules,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn create_parses_loose_enum_spellings() {
        let cli = Cli::try_parse_from([
            "triage",
            "create",
            "--channel",
            "walk-in",
            "--requester",
            "resident",
            "--summary",
            "Pothole",
            "--description",
            "Oak Avenue",
        ])
        .unwrap();
        match cli.command {
            Commands::Create {
                channel,
                requester,
                description,
                ..
            } => {
                assert_eq!(channel, Channel::WalkIn);
                assert_eq!(requester, RequesterType::Resident);
                assert_eq!(description, "Oak Avenue");
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn list_parses_filters() {
        let cli = Cli::try_parse_from([
            "triage",
            "list",
            "--department",
            "public-works",
            "--status",
            "in_progress",
        ])
        .unwrap();
        match cli.command {
            Commands::List { department, status } => {
                assert_eq!(department, Some(Department::PublicWorks));
                assert_eq!(status, Some(LifecycleState::InProgress));
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn create_requires_description() {
        let result = Cli::try_parse_from([
            "triage", "create", "-c", "phone", "-r", "resident", "-s", "Pothole",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(Cli::try_parse_from(["triage", "list", "--status", "reopened"]).is_err());
    }

    #[test]
    fn global_store_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["triage", "stats", "--store", "/tmp/r.json"]).unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/r.json")));
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
    }
}
