//! Simulated game loop for a single episode
//!
//! The agent only decides moves; the loop here plays the part of the game
//! host. It tracks the resource the agent spends walking the maze, stops on
//! the goal or when the resource runs out, and always closes the agent's
//! episode before returning.

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    maze::MazeGrid,
    q_learning::{EpisodeSummary, MazeAgent},
    types::{Action, Material, Position},
};

/// Resource accounting for the simulated game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Resource at the start of each episode
    pub initial_resource: f64,
    /// Cost of every accepted move
    pub step_cost: f64,
    /// Extra cost for entering a soft obstacle
    pub soft_obstacle_cost: f64,
    /// Hard cap on accepted moves per episode
    pub max_steps: usize,
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        if self.initial_resource.is_nan() || self.initial_resource <= 0.0 {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "initial_resource must be positive, got {}",
                    self.initial_resource
                ),
            });
        }
        if !(self.step_cost >= 0.0 && self.soft_obstacle_cost >= 0.0) {
            return Err(Error::InvalidConfiguration {
                message: "move costs must not be negative".to_string(),
            });
        }
        if self.max_steps == 0 {
            return Err(Error::InvalidConfiguration {
                message: "max_steps must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_resource: 1000.0,
            step_cost: 1.0,
            soft_obstacle_cost: 2.0,
            max_steps: 10_000,
        }
    }
}

/// How an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeOutcome {
    ReachedGoal,
    ResourceExhausted,
    /// The agent found no accepted move from its position
    Stuck,
}

/// One accepted move
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepObservation {
    /// Episode number
    pub episode: usize,
    /// Step number within the episode
    pub step: usize,
    /// State the move was chosen in, as a 13-bit string
    pub state: String,
    /// Move taken
    pub action: Action,
    pub from: Position,
    pub to: Position,
    /// Material of the cell entered
    pub material: Material,
    /// Resource left after the move
    pub resource: f64,
}

/// Where an episode is played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeSetup {
    /// Episode number
    pub episode: usize,
    /// Maze dimension
    pub dimension: usize,
    pub start: Position,
    pub goal: Position,
}

/// Result of running one episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRun {
    pub outcome: EpisodeOutcome,
    pub summary: EpisodeSummary,
}

/// Complete record of a finished episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    pub episode: usize,
    pub dimension: usize,
    pub start: Position,
    pub goal: Position,
    pub outcome: EpisodeOutcome,
    /// Accepted moves
    pub steps: usize,
    pub final_resource: f64,
    /// Agent's training round after this episode
    pub training_round: u64,
}

impl EpisodeReport {
    pub fn new(setup: &EpisodeSetup, run: &EpisodeRun) -> Self {
        Self {
            episode: setup.episode,
            dimension: setup.dimension,
            start: setup.start,
            goal: setup.goal,
            outcome: run.outcome,
            steps: run.summary.steps,
            final_resource: run.summary.final_resource,
            training_round: run.summary.training_round,
        }
    }

    pub fn reached_goal(&self) -> bool {
        self.outcome == EpisodeOutcome::ReachedGoal
    }
}

/// Play one episode of `maze` as described by `setup`.
///
/// `on_step` sees every accepted move. The agent's episode is ended even if
/// the callback or the agent fails. Only training episodes count a round.
///
/// # Errors
///
/// Propagates agent errors other than [`Error::ExhaustedRetries`], which ends
/// the episode as [`EpisodeOutcome::Stuck`], and any error from `on_step`.
pub fn run_episode<M, F>(
    agent: &mut MazeAgent,
    maze: &M,
    setup: &EpisodeSetup,
    config: &GameConfig,
    training: bool,
    mut on_step: F,
) -> Result<EpisodeRun>
where
    M: MazeGrid + ?Sized,
    F: FnMut(&StepObservation) -> Result<()>,
{
    agent.init_episode(maze, setup.start, setup.goal)?;

    let mut resource = config.initial_resource;
    let played = play(
        agent,
        config,
        training,
        setup.episode,
        &mut resource,
        &mut on_step,
    );
    let summary = if training {
        agent.end_episode(resource)
    } else {
        agent.close_episode(resource)
    };

    Ok(EpisodeRun {
        outcome: played?,
        summary,
    })
}

fn play<F>(
    agent: &mut MazeAgent,
    config: &GameConfig,
    training: bool,
    episode_num: usize,
    resource: &mut f64,
    on_step: &mut F,
) -> Result<EpisodeOutcome>
where
    F: FnMut(&StepObservation) -> Result<()>,
{
    let mut step = 0;
    loop {
        let episode = agent.episode().ok_or(Error::NoActiveEpisode)?;
        if episode.reached_goal() {
            return Ok(EpisodeOutcome::ReachedGoal);
        }
        if *resource <= 0.0 || step >= config.max_steps {
            return Ok(EpisodeOutcome::ResourceExhausted);
        }

        let from = episode.position();
        let state = episode.state();

        let action = match agent.step(training) {
            Ok(action) => action,
            Err(Error::ExhaustedRetries { .. }) => return Ok(EpisodeOutcome::Stuck),
            Err(err) => return Err(err),
        };

        let episode = agent.episode().ok_or(Error::NoActiveEpisode)?;
        let to = episode.position();
        let material = episode.maze().material_at(to);

        *resource -= config.step_cost;
        if material == Material::SoftObstacle {
            *resource -= config.soft_obstacle_cost;
        }

        on_step(&StepObservation {
            episode: episode_num,
            step,
            state: state.to_string(),
            action,
            from,
            to,
            material,
            resource: *resource,
        })?;
        step += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{maze::Maze, q_learning::QTable};

    fn setup(sx: i32, sy: i32, gx: i32, gy: i32) -> EpisodeSetup {
        EpisodeSetup {
            episode: 0,
            dimension: 0,
            start: Position::new(sx, sy),
            goal: Position::new(gx, gy),
        }
    }

    fn greedy_agent() -> MazeAgent {
        MazeAgent::default()
            .with_seed(5)
            .with_q_table(QTable::filled(0.9, 0.8, 0.0))
    }

    #[test]
    fn test_reaches_adjacent_goal() {
        let mut agent = greedy_agent();
        let maze = Maze::walled(5);
        let mut seen = Vec::new();

        let run = run_episode(
            &mut agent,
            &maze,
            &setup(1, 1, 1, 2),
            &GameConfig::default(),
            false,
            |step| {
                seen.push(step.clone());
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(run.outcome, EpisodeOutcome::ReachedGoal);
        assert_eq!(run.summary.steps, 1);
        assert_eq!(run.summary.final_resource, 999.0);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].action, Action::Up);
        // Evaluation play does not count a training round
        assert_eq!(run.summary.training_round, 0);
        assert_eq!(agent.training_round(), 0);
        assert!(agent.episode().is_none());
    }

    #[test]
    fn test_soft_obstacle_costs_extra() {
        let mut maze = Maze::walled(5);
        maze.set(Position::new(1, 2), Material::SoftObstacle);
        let mut agent = greedy_agent();

        let run = run_episode(
            &mut agent,
            &maze,
            &setup(1, 1, 1, 2),
            &GameConfig::default(),
            false,
            |_| Ok(()),
        )
        .unwrap();

        assert_eq!(run.summary.final_resource, 997.0);
    }

    #[test]
    fn test_resource_runs_out() {
        let mut agent = greedy_agent();
        let maze = Maze::walled(7);
        let config = GameConfig {
            initial_resource: 3.0,
            ..GameConfig::default()
        };

        let run = run_episode(
            &mut agent,
            &maze,
            &setup(1, 1, 5, 5),
            &config,
            true,
            |_| Ok(()),
        )
        .unwrap();

        assert!(matches!(
            run.outcome,
            EpisodeOutcome::ResourceExhausted | EpisodeOutcome::ReachedGoal
        ));
        assert!(run.summary.steps <= 3);
        assert_eq!(agent.training_round(), 1);
    }

    #[test]
    fn test_boxed_in_start_is_stuck() {
        let mut maze = Maze::walled(5);
        for (x, y) in [(1, 2), (3, 2), (2, 1), (2, 3)] {
            maze.set(Position::new(x, y), Material::Wall);
        }
        let mut agent = greedy_agent();

        let run = run_episode(
            &mut agent,
            &maze,
            &setup(2, 2, 3, 3),
            &GameConfig::default(),
            false,
            |_| Ok(()),
        )
        .unwrap();

        assert_eq!(run.outcome, EpisodeOutcome::Stuck);
        assert_eq!(run.summary.steps, 0);
        assert!(agent.episode().is_none());
    }

    #[test]
    fn test_callback_error_still_ends_episode() {
        let mut agent = greedy_agent();
        let maze = Maze::walled(5);

        let result = run_episode(
            &mut agent,
            &maze,
            &setup(1, 1, 3, 3),
            &GameConfig::default(),
            false,
            |_| {
                Err(Error::InvalidConfiguration {
                    message: "stop".to_string(),
                })
            },
        );

        assert!(result.is_err());
        assert!(agent.episode().is_none());
        assert_eq!(agent.training_round(), 0);
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        assert!(GameConfig::default().validate().is_ok());
        let config = GameConfig {
            initial_resource: 0.0,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
        let config = GameConfig {
            max_steps: 0,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nan_costs() {
        let config = GameConfig {
            step_cost: f64::NAN,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
        let config = GameConfig {
            soft_obstacle_cost: f64::NAN,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
        let config = GameConfig {
            step_cost: -1.0,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
