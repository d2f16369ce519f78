//! Train command - Train a maze agent over generated or fixed mazes

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde::Serialize;
use serde_json::to_writer_pretty;

use crate::{
    app::{AgentConfig, App},
    cli::{
        config::{GameArgs, MazeArgs},
        output::{format_number, print_kv, print_section},
    },
    maze::MazeGrid,
    pipeline::{
        CsvObserver, JsonlObserver, MazeSource, ProgressObserver, TrainingConfig, TrainingPipeline,
        TrainingResult,
    },
};

#[derive(Parser, Debug)]
#[command(about = "Train a maze agent")]
pub struct TrainArgs {
    /// Number of training episodes
    #[arg(long, short = 'e', default_value_t = 1000)]
    pub episodes: usize,

    /// Stop once the agent has trained this many rounds, counting earlier runs
    #[arg(long)]
    pub max_training_round: Option<u64>,

    /// Directory of saved agents
    #[arg(long, short = 's')]
    pub store: Option<PathBuf>,

    /// Continue training the agent saved in this slot
    #[arg(long)]
    pub resume: Option<usize>,

    /// Do not save the trained agent
    #[arg(long, default_value_t = false)]
    pub no_save: bool,

    /// JSON file with agent hyperparameters
    #[arg(long)]
    pub agent_config: Option<PathBuf>,

    /// Learning rate α (0.0-1.0)
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Discount factor γ (0.0-1.0)
    #[arg(long)]
    pub discount: Option<f64>,

    /// Exploration rate (0.0-1.0)
    #[arg(long)]
    pub exploration: Option<f64>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub maze: MazeArgs,

    #[command(flatten)]
    pub game: GameArgs,

    /// Optional file for JSONL observations
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Optional file for a per-episode CSV log
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

#[derive(Debug, Serialize)]
struct TrainingSummaryFile<'a> {
    training: &'a TrainingResult,
    agent: &'a AgentConfig,
    maze: String,
    saved_slot: Option<usize>,
}

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Treat trailing separators or missing filename as a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

fn agent_config(args: &TrainArgs) -> Result<AgentConfig> {
    let mut config = match &args.agent_config {
        Some(path) => AgentConfig::from_json_file(path)
            .with_context(|| format!("Failed to load agent config: {}", path.display()))?,
        None => AgentConfig::new(),
    };

    if let Some(rate) = args.learning_rate {
        config = config.with_learning_rate(rate);
    }
    if let Some(factor) = args.discount {
        config = config.with_discount_factor(factor);
    }
    if let Some(rate) = args.exploration {
        config = config.with_exploration_rate(rate);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    config.validate()?;
    Ok(config)
}

fn describe_source(source: &MazeSource) -> String {
    match source {
        MazeSource::Fixed { maze, .. } => format!("fixed {0}x{0}", maze.dimension()),
        MazeSource::Generated {
            dimension,
            grow_on_goal,
            max_dimension,
        } => {
            if *grow_on_goal {
                format!("generated {dimension}x{dimension}, growing to {max_dimension}")
            } else {
                format!("generated {dimension}x{dimension}")
            }
        }
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = agent_config(&args)?;

    if args.resume.is_some() && args.store.is_none() {
        return Err(anyhow!("--resume requires --store"));
    }

    let app = match &args.store {
        Some(dir) => App::with_store(dir.clone()),
        None => App::new(),
    };

    let mut agent = match args.resume {
        Some(slot) => {
            let mut agent = app.load_or_create(slot, config.clone())?;
            if let Some(rate) = args.exploration {
                agent.set_exploration_rate(rate);
            }
            agent
        }
        None => app.create_agent(config.clone())?,
    };

    let source = args.maze.source()?;
    let maze_description = describe_source(&source);

    let training_config = TrainingConfig {
        num_episodes: args.episodes,
        maze: source,
        seed: args.seed,
        training: true,
        max_training_round: args.max_training_round,
        game: args.game.config(),
    };

    print_section("Training Configuration");
    print_kv("Episodes", &format_number(args.episodes));
    print_kv("Maze", &maze_description);
    print_kv("Learning rate", &format!("{}", agent.q_table().learning_rate()));
    print_kv("Discount", &format!("{}", agent.q_table().discount_factor()));
    print_kv("Exploration", &format!("{}", agent.exploration_rate()));
    print_kv("Training round", &format_number(agent.training_round() as usize));
    if let Some(cap) = args.max_training_round {
        print_kv("Round cap", &format_number(cap as usize));
    }
    if let Some(seed) = args.seed {
        print_kv("Seed", &seed.to_string());
    }

    let mut pipeline = TrainingPipeline::new(training_config);

    if !args.no_progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }

    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("Failed to create observations file: {}", path.display()))?;
        pipeline = pipeline.with_observer(Box::new(observer));
    }
    if let Some(path) = &args.csv {
        let observer = CsvObserver::new(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        pipeline = pipeline.with_observer(Box::new(observer));
    }

    let result = pipeline.run(&mut agent)?;

    print_section("Training Results");
    print_kv("Episodes", &format_number(result.total_episodes));
    print_kv(
        "Goals",
        &format!("{} ({:.1}%)", result.goals, result.goal_rate * 100.0),
    );
    print_kv("Exhausted", &format_number(result.exhausted));
    print_kv("Stuck", &format_number(result.stuck));
    print_kv("Average steps", &format!("{:.1}", result.avg_steps));
    print_kv("Final dimension", &result.final_dimension.to_string());

    let saved_slot = if args.no_save {
        None
    } else if args.store.is_some() {
        let slot = app.save_agent(&agent)?;
        println!("\n✓ Agent saved to slot {slot}");
        Some(slot)
    } else {
        println!("\nNo --store given; the trained agent was not saved.");
        None
    };

    if let Some(raw) = &args.summary {
        let path = sanitize_summary_path(raw);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let file = File::create(&path)
            .with_context(|| format!("Failed to create summary file: {}", path.display()))?;
        to_writer_pretty(
            file,
            &TrainingSummaryFile {
                training: &result,
                agent: &config,
                maze: maze_description,
                saved_slot,
            },
        )?;
        println!("✓ Summary written to: {}", path.display());
    }

    Ok(())
}
