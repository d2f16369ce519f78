//! Evaluate command - Run a saved agent with learning and exploration off

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde::Serialize;

use crate::{
    app::{AgentConfig, App},
    cli::{
        config::{GameArgs, MazeArgs},
        output::{format_number, print_kv, print_section},
    },
    pipeline::{ProgressObserver, TrainingConfig, TrainingPipeline, TrainingResult},
    q_learning::MazeAgent,
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a saved maze agent")]
pub struct EvaluateArgs {
    /// Directory of saved agents
    #[arg(long, short = 's')]
    pub store: PathBuf,

    /// Slot to evaluate (defaults to the most recent)
    #[arg(long)]
    pub slot: Option<usize>,

    /// Number of evaluation episodes
    #[arg(long, short = 'e', default_value_t = 50)]
    pub episodes: usize,

    /// Seed for maze generation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Also evaluate an untrained agent on the same mazes
    #[arg(long, default_value_t = false)]
    pub baseline: bool,

    #[command(flatten)]
    pub maze: MazeArgs,

    #[command(flatten)]
    pub game: GameArgs,

    /// Export results to file
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

#[derive(Debug, Serialize)]
struct EvaluationExport<'a> {
    slot: usize,
    training_round: u64,
    evaluation: &'a TrainingResult,
    baseline: Option<&'a TrainingResult>,
}

fn evaluate(agent: &mut MazeAgent, args: &EvaluateArgs) -> Result<TrainingResult> {
    let config = TrainingConfig {
        num_episodes: args.episodes,
        maze: args.maze.source()?,
        seed: args.seed,
        training: false,
        max_training_round: None,
        game: args.game.config(),
    };

    let mut pipeline = TrainingPipeline::new(config);
    if !args.no_progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    Ok(pipeline.run(agent)?)
}

fn print_result(title: &str, result: &TrainingResult) {
    print_section(title);
    print_kv("Episodes", &format_number(result.total_episodes));
    print_kv(
        "Goals",
        &format!("{} ({:.1}%)", result.goals, result.goal_rate * 100.0),
    );
    print_kv("Exhausted", &format_number(result.exhausted));
    print_kv("Stuck", &format_number(result.stuck));
    print_kv("Average steps", &format!("{:.1}", result.avg_steps));
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let app = App::with_store(args.store.clone());

    let slot = match args.slot {
        Some(slot) => slot,
        None => app
            .saved_indices()?
            .last()
            .copied()
            .ok_or_else(|| anyhow!("No saved agents in {}", args.store.display()))?,
    };

    println!("Loading agent from slot {slot} in {}", args.store.display());
    let mut agent = app.load_agent(slot)?;
    let training_round = agent.training_round();

    print_section("Loaded Agent Info");
    print_kv("Training round", &format_number(training_round as usize));
    print_kv("Learning rate", &agent.q_table().learning_rate().to_string());
    print_kv("Discount", &agent.q_table().discount_factor().to_string());

    let result = evaluate(&mut agent, &args)?;
    print_result("Evaluation Results", &result);

    let baseline = if args.baseline {
        let mut config = AgentConfig::new();
        if let Some(seed) = args.seed {
            config = config.with_seed(seed);
        }
        let mut fresh = app.create_agent(config)?;
        let baseline = evaluate(&mut fresh, &args)?;
        print_result("Untrained Baseline", &baseline);
        Some(baseline)
    } else {
        None
    };

    if let Some(path) = &args.export {
        let file = File::create(path)
            .with_context(|| format!("Failed to create export file: {}", path.display()))?;
        serde_json::to_writer_pretty(
            file,
            &EvaluationExport {
                slot,
                training_round,
                evaluation: &result,
                baseline: baseline.as_ref(),
            },
        )?;
        println!("\n✓ Results exported to: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_latest_slot() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::with_store(dir.path());
        let agent = app.create_agent(AgentConfig::new().with_seed(4)).unwrap();
        app.save_agent(&agent).unwrap();
        app.save_agent(&agent).unwrap();

        let export = dir.path().join("eval.json");
        let args = EvaluateArgs::try_parse_from([
            "evaluate",
            "--store",
            dir.path().to_str().unwrap(),
            "--episodes",
            "3",
            "--dimension",
            "5",
            "--seed",
            "1",
            "--baseline",
            "--no-progress",
            "--export",
            export.to_str().unwrap(),
        ])
        .unwrap();
        execute(args).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&export).unwrap()).unwrap();
        assert_eq!(json["slot"], 1);
        assert_eq!(json["evaluation"]["total_episodes"], 3);
        assert_eq!(json["baseline"]["total_episodes"], 3);
    }

    #[test]
    fn test_empty_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = EvaluateArgs::try_parse_from([
            "evaluate",
            "--store",
            dir.path().to_str().unwrap(),
            "--no-progress",
        ])
        .unwrap();
        assert!(execute(args).is_err());
    }
}
