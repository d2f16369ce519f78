//! Common test utilities for the maze-learner test suite.
//!
//! Shared maze fixtures and episode helpers used across multiple tests.

#![allow(dead_code)]

use maze_learner::{
    Maze, MazeAgent, MazeGrid, Position,
    pipeline::{EpisodeOutcome, EpisodeSetup, GameConfig, run_episode},
};

/// Start cell of the small open maze.
pub const OPEN_START: Position = Position::new(1, 1);

/// Goal cell of the small open maze.
pub const OPEN_GOAL: Position = Position::new(3, 2);

/// A 5x5 maze: wall ring around an open 3x3 interior.
pub fn open_maze() -> Maze {
    Maze::walled(5)
}

/// Resource accounting that ends an episode after `max_steps` moves.
pub fn capped_game(max_steps: usize) -> GameConfig {
    GameConfig {
        initial_resource: max_steps as f64,
        step_cost: 1.0,
        soft_obstacle_cost: 0.0,
        max_steps,
    }
}

/// A seeded agent with the default hyperparameters.
pub fn seeded_agent(seed: u64) -> MazeAgent {
    MazeAgent::default().with_seed(seed)
}

/// Play `episodes` episodes of `maze` and return the average number of moves.
pub fn average_steps(
    agent: &mut MazeAgent,
    maze: &Maze,
    start: Position,
    goal: Position,
    game: &GameConfig,
    episodes: usize,
    training: bool,
) -> f64 {
    let dimension = maze.dimension();
    let mut total = 0usize;
    for episode in 0..episodes {
        let setup = EpisodeSetup {
            episode,
            dimension,
            start,
            goal,
        };
        let run = run_episode(agent, maze, &setup, game, training, |_| Ok(()))
            .expect("episode should run");
        total += run.summary.steps;
    }
    total as f64 / episodes as f64
}

/// Count how many of `episodes` episodes reach the goal.
pub fn goals_reached(
    agent: &mut MazeAgent,
    maze: &Maze,
    game: &GameConfig,
    episodes: usize,
    training: bool,
) -> usize {
    let dimension = maze.dimension();
    (0..episodes)
        .filter(|&episode| {
            let setup = EpisodeSetup {
                episode,
                dimension,
                start: OPEN_START,
                goal: OPEN_GOAL,
            };
            let run = run_episode(agent, maze, &setup, game, training, |_| Ok(()))
                .expect("episode should run");
            run.outcome == EpisodeOutcome::ReachedGoal
        })
        .count()
}
