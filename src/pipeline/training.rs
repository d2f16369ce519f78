//! Training pipeline for the maze agent

use serde::{Deserialize, Serialize};

use super::episode::{EpisodeOutcome, EpisodeReport, EpisodeSetup, GameConfig, run_episode};
use crate::{
    Error, Result,
    maze::{Maze, MazeGenerator, MazeGrid, default_goal, default_start, generator::MIN_DIMENSION},
    ports::Observer,
    q_learning::MazeAgent,
    types::Position,
};

/// Where the pipeline gets its mazes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MazeSource {
    /// The same maze every episode
    Fixed {
        maze: Maze,
        start: Position,
        goal: Position,
    },
    /// A freshly generated maze every episode
    Generated {
        /// Dimension of the first maze
        dimension: usize,
        /// Grow the maze by 2 after each episode that reaches the goal
        grow_on_goal: bool,
        /// Upper bound for growth
        max_dimension: usize,
    },
}

impl Default for MazeSource {
    fn default() -> Self {
        Self::Generated {
            dimension: 11,
            grow_on_goal: true,
            max_dimension: 41,
        }
    }
}

/// Training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of episodes to play
    pub num_episodes: usize,

    /// Maze source
    pub maze: MazeSource,

    /// Seed for maze generation
    pub seed: Option<u64>,

    /// Whether the agent learns and explores
    pub training: bool,

    /// Stop training once the agent's round counter reaches this value.
    /// Counts rounds from earlier runs too; ignored for evaluation.
    pub max_training_round: Option<u64>,

    /// Resource accounting
    pub game: GameConfig,
}

impl TrainingConfig {
    /// Same configuration with learning and exploration switched off.
    pub fn for_evaluation(mut self) -> Self {
        self.training = false;
        self
    }

    /// Episodes to play for an agent currently at `training_round`.
    pub fn planned_episodes(&self, training_round: u64) -> usize {
        match self.max_training_round {
            Some(cap) if self.training => {
                let remaining = cap.saturating_sub(training_round);
                self.num_episodes
                    .min(usize::try_from(remaining).unwrap_or(usize::MAX))
            }
            _ => self.num_episodes,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.game.validate()?;
        match &self.maze {
            MazeSource::Fixed { maze, start, .. } => {
                if !maze.contains(*start) {
                    return Err(Error::PositionOutOfBounds {
                        position: *start,
                        dimension: maze.dimension(),
                    });
                }
            }
            MazeSource::Generated {
                dimension,
                max_dimension,
                ..
            } => {
                if *dimension < MIN_DIMENSION {
                    return Err(Error::InvalidConfiguration {
                        message: format!(
                            "maze dimension must be at least {MIN_DIMENSION}, got {dimension}"
                        ),
                    });
                }
                if max_dimension < dimension {
                    return Err(Error::InvalidConfiguration {
                        message: format!(
                            "max_dimension {max_dimension} is smaller than dimension {dimension}"
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_episodes: 1000,
            maze: MazeSource::default(),
            seed: None,
            training: true,
            max_training_round: None,
            game: GameConfig::default(),
        }
    }
}

/// Result of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Total episodes played
    pub total_episodes: usize,

    /// Episodes that reached the goal
    pub goals: usize,

    /// Episodes that ran out of resource
    pub exhausted: usize,

    /// Episodes that found no valid move
    pub stuck: usize,

    /// Goal rate
    pub goal_rate: f64,

    /// Average accepted moves per episode
    pub avg_steps: f64,

    /// Maze dimension after the last episode
    pub final_dimension: usize,

    /// Agent's training round after the last episode
    pub training_round: u64,
}

impl TrainingResult {
    /// Summarise a run from its episode reports
    pub fn from_reports(reports: &[EpisodeReport], final_dimension: usize, training_round: u64) -> Self {
        let count = |outcome| reports.iter().filter(|r| r.outcome == outcome).count();
        let total_episodes = reports.len();
        let goals = count(EpisodeOutcome::ReachedGoal);

        let (goal_rate, avg_steps) = if total_episodes > 0 {
            (
                goals as f64 / total_episodes as f64,
                reports.iter().map(|r| r.steps).sum::<usize>() as f64 / total_episodes as f64,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            total_episodes,
            goals,
            exhausted: count(EpisodeOutcome::ResourceExhausted),
            stuck: count(EpisodeOutcome::Stuck),
            goal_rate,
            avg_steps,
            final_dimension,
            training_round,
        }
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Training pipeline for a single maze agent
pub struct TrainingPipeline {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl TrainingPipeline {
    /// Create a new training pipeline
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Play the configured number of episodes with `agent`.
    ///
    /// Learning accumulates in the agent across episodes. Episodes in which
    /// the agent gets stuck are counted and reported, not treated as errors.
    /// Training stops early once the agent reaches `max_training_round`.
    pub fn run(&mut self, agent: &mut MazeAgent) -> Result<TrainingResult> {
        self.config.validate()?;

        let num_episodes = self.config.planned_episodes(agent.training_round());
        if num_episodes < self.config.num_episodes {
            eprintln!(
                "Warning: agent is at training round {}; playing {} of {} episodes before the cap of {}.",
                agent.training_round(),
                num_episodes,
                self.config.num_episodes,
                self.config.max_training_round.unwrap_or_default()
            );
        }

        let mut generator = MazeGenerator::new(self.config.seed);
        let mut dimension = match &self.config.maze {
            MazeSource::Fixed { maze, .. } => maze.dimension(),
            MazeSource::Generated { dimension, .. } => *dimension,
        };
        let mut reports = Vec::with_capacity(num_episodes);

        // Notify observers of training start
        for observer in &mut self.observers {
            observer.on_training_start(num_episodes)?;
        }

        for episode in 0..num_episodes {
            let generated;
            let (maze, start, goal) = match &self.config.maze {
                MazeSource::Fixed { maze, start, goal } => (maze, *start, *goal),
                MazeSource::Generated { .. } => {
                    generated = generator.generate(dimension)?;
                    (&generated, default_start(), default_goal(dimension))
                }
            };

            let setup = EpisodeSetup {
                episode,
                dimension: maze.dimension(),
                start,
                goal,
            };

            for observer in &mut self.observers {
                observer.on_episode_start(&setup)?;
            }

            let observers = &mut self.observers;
            let run = run_episode(
                agent,
                maze,
                &setup,
                &self.config.game,
                self.config.training,
                |step| {
                    for observer in observers.iter_mut() {
                        observer.on_step(step)?;
                    }
                    Ok(())
                },
            )?;
            let report = EpisodeReport::new(&setup, &run);

            for observer in &mut self.observers {
                observer.on_episode_end(&report)?;
            }

            if let MazeSource::Generated {
                grow_on_goal: true,
                max_dimension,
                ..
            } = &self.config.maze
            {
                if report.reached_goal() {
                    dimension = (dimension + 2).min(*max_dimension);
                }
            }

            reports.push(report);
        }

        // Notify observers of training end
        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        let result = TrainingResult::from_reports(&reports, dimension, agent.training_round());
        if result.stuck > 0 {
            eprintln!(
                "Warning: agent found no valid move in {} of {} episodes.",
                result.stuck, result.total_episodes
            );
        }

        Ok(result)
    }
}
