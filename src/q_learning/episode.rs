//! Per-episode agent state, rewards and move validity

use serde::{Deserialize, Serialize};

use crate::{
    features::{FeatureVector, compute_features},
    maze::{Maze, MazeGrid, VisitedGrid},
    state::{DistanceTracker, StateIndex},
    types::{Material, Position},
};

/// Reward for reaching the goal.
pub const GOAL_REWARD: f64 = 100.0;
/// Reward for ending up on or beyond the outer ring.
pub const BORDER_REWARD: f64 = -100.0;
/// Reward for moving onto open road.
pub const OPEN_REWARD: f64 = -1.0;
/// Reward for moving into a soft obstacle.
pub const SOFT_OBSTACLE_REWARD: f64 = -5.0;
/// Reward for moving into a wall.
pub const WALL_REWARD: f64 = -20.0;

/// Immediate reward for arriving at `position`.
///
/// The goal check comes first, so a goal on the outer ring still pays
/// [`GOAL_REWARD`].
pub fn reward<M: MazeGrid + ?Sized>(maze: &M, goal: Position, position: Position) -> f64 {
    if position == goal {
        return GOAL_REWARD;
    }
    if maze.is_border(position) {
        return BORDER_REWARD;
    }
    match maze.material_at(position) {
        Material::Open => OPEN_REWARD,
        Material::SoftObstacle => SOFT_OBSTACLE_REWARD,
        Material::Wall => WALL_REWARD,
    }
}

/// A move is valid if it reaches the goal or does not end inside a wall.
pub fn is_valid_move<M: MazeGrid + ?Sized>(maze: &M, goal: Position, position: Position) -> bool {
    position == goal || maze.material_at(position) != Material::Wall
}

/// Lifecycle of the current episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodePhase {
    /// `init_episode` has not been called since the last episode ended.
    Idle,
    /// Steps may be taken.
    Active,
}

/// Everything the agent tracks for one pass through a maze.
#[derive(Debug, Clone)]
pub struct Episode {
    maze: Maze,
    goal: Position,
    position: Position,
    visited: VisitedGrid,
    features: FeatureVector,
    state: StateIndex,
    distance: DistanceTracker,
    steps: usize,
}

impl Episode {
    /// Start an episode at `start`.
    ///
    /// The start cell is marked visited and the distance tracker starts at the
    /// start-to-goal distance, so the initial state never carries the
    /// progress bit.
    pub fn new(maze: Maze, start: Position, goal: Position) -> Self {
        let mut visited = VisitedGrid::new(maze.dimension());
        visited.mark(start);

        let features = compute_features(start, &maze, &visited, goal);
        let mut distance = DistanceTracker::new(f64::from(start.manhattan_distance(goal)));
        let state = distance.encode(&features);

        Self {
            maze,
            goal,
            position: start,
            visited,
            features,
            state,
            distance,
            steps: 0,
        }
    }

    /// Features and state the agent would observe at `candidate`, without
    /// committing anything.
    pub fn probe(&self, candidate: Position) -> (FeatureVector, StateIndex) {
        let features = compute_features(candidate, &self.maze, &self.visited, self.goal);
        let state = self.distance.peek(&features);
        (features, state)
    }

    /// Move to an accepted position.
    pub(crate) fn advance(&mut self, position: Position, features: FeatureVector) {
        self.position = position;
        self.visited.mark(position);
        self.state = self.distance.encode(&features);
        self.features = features;
        self.steps += 1;
    }

    pub fn reward(&self, position: Position) -> f64 {
        reward(&self.maze, self.goal, position)
    }

    pub fn is_valid_move(&self, position: Position) -> bool {
        is_valid_move(&self.maze, self.goal, position)
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn visited(&self) -> &VisitedGrid {
        &self.visited
    }

    pub fn features(&self) -> &FeatureVector {
        &self.features
    }

    pub fn state(&self) -> StateIndex {
        self.state
    }

    pub fn previous_distance(&self) -> f64 {
        self.distance.previous()
    }

    /// Accepted moves so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn reached_goal(&self) -> bool {
        self.position == self.goal
    }
}
