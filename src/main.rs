mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use promptpilot::config::PilotConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "promptpilot", version, about = "Question answering with per-project memory")]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask a question
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
        /// Recall context from this project's memory first
        #[arg(long)]
        project: Option<String>,
        /// Number of passages to recall
        #[arg(short)]
        k: Option<usize>,
    },
    /// Manage project memories
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },
}

#[derive(Subcommand)]
enum MemoryAction {
    /// Store a text
    Add {
        project: String,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Find the stored texts closest to a query
    Search {
        project: String,
        #[arg(required = true)]
        query: Vec<String>,
        #[arg(short)]
        k: Option<usize>,
    },
    /// Delete everything stored for a project
    Delete {
        project: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show statistics for a project
    Stats { project: String },
    /// List projects
    List,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // A missing .env is normal.
    let _ = dotenvy::dotenv();

    let config = match &cli.config {
        Some(path) => PilotConfig::load_from(path),
        None => PilotConfig::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            eprintln!("hint: fix the config file or pass another one with --config");
            return ExitCode::from(2);
        }
    };

    // Log to stderr so stdout carries only answers and results.
    let filter =
        EnvFilter::try_new(&config.log.level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let (code, hint) = cli::classify(&e);
            eprintln!("error: {e:#}");
            eprintln!("hint: {hint}");
            ExitCode::from(code)
        }
    }
}

fn run(command: Command, config: &PilotConfig) -> Result<()> {
    let default_k = config.retrieval.default_k;
    match command {
        Command::Ask {
            question,
            project,
            k,
        } => cli::ask::ask(
            config,
            &cli::join_words(&question),
            project.as_deref(),
            k.unwrap_or(default_k),
        ),
        Command::Memory { action } => match action {
            MemoryAction::Add { project, text } => {
                cli::memory::add(config, &project, &cli::join_words(&text))
            }
            MemoryAction::Search { project, query, k } => cli::memory::search(
                config,
                &project,
                &cli::join_words(&query),
                k.unwrap_or(default_k),
            ),
            MemoryAction::Delete { project, yes } => cli::memory::delete(config, &project, yes),
            MemoryAction::Stats { project } => cli::memory::stats(config, &project),
            MemoryAction::List => cli::memory::list(config),
        },
    }
}
