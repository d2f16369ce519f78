//! maze-learner CLI - Train and evaluate tabular Q-learning maze agents
//!
//! This CLI provides a unified interface for:
//! - Training an agent over generated or fixed mazes, resuming from saved slots
//! - Evaluating saved agents with learning and exploration switched off

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "maze-learner")]
#[command(version, about = "Q-learning agent for grid mazes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent
    Train(Box<maze_learner::cli::commands::train::TrainArgs>),

    /// Evaluate a saved agent
    Evaluate(Box<maze_learner::cli::commands::evaluate::EvaluateArgs>),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => maze_learner::cli::commands::train::execute(*args),
        Commands::Evaluate(args) => maze_learner::cli::commands::evaluate::execute(*args),
    }
}
