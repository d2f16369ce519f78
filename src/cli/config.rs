//! Shared configuration flags for CLI commands

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::{
    maze::{Maze, MazeGrid, default_goal, default_start},
    pipeline::{GameConfig, MazeSource},
};

/// Where episodes are played
#[derive(Args, Debug, Clone)]
pub struct MazeArgs {
    /// Dimension of the first generated maze
    #[arg(long, short = 'd', default_value_t = 11)]
    pub dimension: usize,

    /// Largest dimension reached by growth
    #[arg(long, default_value_t = 41)]
    pub max_dimension: usize,

    /// Keep the maze size fixed instead of growing it after each goal
    #[arg(long, default_value_t = false)]
    pub no_growth: bool,

    /// Play a fixed maze from a JSON file of material codes (`codes[x][y]`)
    #[arg(long)]
    pub maze_file: Option<PathBuf>,
}

impl MazeArgs {
    pub fn source(&self) -> Result<MazeSource> {
        let Some(path) = &self.maze_file else {
            return Ok(MazeSource::Generated {
                dimension: self.dimension,
                grow_on_goal: !self.no_growth,
                max_dimension: self.max_dimension.max(self.dimension),
            });
        };

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read maze file: {}", path.display()))?;
        let codes: Vec<Vec<u8>> = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse maze file: {}", path.display()))?;
        let maze = Maze::from_codes(&codes)?;
        let dimension = maze.dimension();

        Ok(MazeSource::Fixed {
            maze,
            start: default_start(),
            goal: default_goal(dimension),
        })
    }
}

/// Resource accounting flags
#[derive(Args, Debug, Clone)]
pub struct GameArgs {
    /// Resource at the start of each episode
    #[arg(long, default_value_t = 1000.0)]
    pub initial_resource: f64,

    /// Cost of each accepted move
    #[arg(long, default_value_t = 1.0)]
    pub step_cost: f64,

    /// Extra cost for entering a soft obstacle
    #[arg(long, default_value_t = 2.0)]
    pub soft_obstacle_cost: f64,

    /// Hard cap on moves per episode
    #[arg(long, default_value_t = 10_000)]
    pub max_steps: usize,
}

impl GameArgs {
    pub fn config(&self) -> GameConfig {
        GameConfig {
            initial_resource: self.initial_resource,
            step_cost: self.step_cost,
            soft_obstacle_cost: self.soft_obstacle_cost,
            max_steps: self.max_steps,
        }
    }
}
