mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::id::IdSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "hodge",
    about = "Feature workflow CLI — explore, build, harden, ship, with local-first PM sync",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .hodge/ or .git/)
    #[arg(long, global = true, env = "HODGE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize hodge in the current project
    Init,

    /// Enter the explore phase for a feature (creates it if unknown)
    Explore { feature: String },

    /// Enter the build phase for a feature
    Build { feature: String },

    /// Enter the harden phase for a feature
    Harden { feature: String },

    /// Ship a feature
    Ship {
        feature: String,

        /// Decision made during the feature (repeatable)
        #[arg(long = "decision")]
        decisions: Vec<String>,

        /// Pattern applied or extracted (repeatable)
        #[arg(long = "pattern")]
        patterns: Vec<String>,

        /// Number of tests that passed
        #[arg(long)]
        tests_passed: Option<u32>,

        /// Coverage percentage
        #[arg(long)]
        coverage: Option<u8>,

        /// Ship commit hash
        #[arg(long)]
        commit: Option<String>,
    },

    /// Manage feature IDs and external links
    Id {
        #[command(subcommand)]
        subcommand: IdSubcommand,
    },

    /// Replay queued external PM operations
    Sync,

    /// Show per-feature status from the local mirror
    Status,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Explore { feature } => cmd::phase::explore(&root, &feature, cli.json),
        Commands::Build { feature } => cmd::phase::build(&root, &feature, cli.json),
        Commands::Harden { feature } => cmd::phase::harden(&root, &feature, cli.json),
        Commands::Ship {
            feature,
            decisions,
            patterns,
            tests_passed,
            coverage,
            commit,
        } => cmd::phase::ship(
            &root,
            &feature,
            decisions,
            patterns,
            tests_passed,
            coverage,
            commit,
            cli.json,
        ),
        Commands::Id { subcommand } => cmd::id::run(&root, subcommand, cli.json),
        Commands::Sync => cmd::sync::run(&root, cli.json),
        Commands::Status => cmd::status::run(&root, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
