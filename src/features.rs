//! Feature extraction
//!
//! Turns the agent's position, the maze and the visitation history into a
//! fixed-size vector of 13 readings: three per compass direction followed by
//! the Manhattan distance to the goal. The vector is recomputed from scratch
//! for every candidate move.
//!
//! All boundary handling follows the maze's border rule: a position on or
//! beyond the outer one-cell ring is treated as blocked in every direction,
//! regardless of what the maze holds there.

use serde::{Deserialize, Serialize};

use crate::{
    maze::{MazeGrid, VisitedGrid},
    types::{ACTION_COUNT, Action, Material, Position},
};

/// Readings per direction: free-run length, terminal material, visited flag.
pub const FEATURES_PER_DIRECTION: usize = 3;

/// Total number of features.
pub const FEATURE_COUNT: usize = ACTION_COUNT * FEATURES_PER_DIRECTION + 1;

/// Slot of the goal-distance feature.
pub const GOAL_DISTANCE_SLOT: usize = FEATURE_COUNT - 1;

/// Readings for a single direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionProbe {
    /// Consecutive open interior cells before the scan stops.
    pub free_run: u32,
    /// Material of the cell the scan stopped on.
    pub terminal: Material,
    /// Whether the adjacent cell has been visited this episode.
    pub visited: bool,
}

impl DirectionProbe {
    const BLOCKED: DirectionProbe = DirectionProbe {
        free_run: 0,
        terminal: Material::Wall,
        visited: false,
    };
}

/// Ordered feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn get(&self, slot: usize) -> Option<f64> {
        self.values.get(slot).copied()
    }

    pub fn free_run(&self, action: Action) -> f64 {
        self.values[action.index() * FEATURES_PER_DIRECTION]
    }

    pub fn terminal_material(&self, action: Action) -> f64 {
        self.values[action.index() * FEATURES_PER_DIRECTION + 1]
    }

    pub fn visited(&self, action: Action) -> bool {
        self.values[action.index() * FEATURES_PER_DIRECTION + 2] != 0.0
    }

    pub fn goal_distance(&self) -> f64 {
        self.values[GOAL_DISTANCE_SLOT]
    }
}

/// Probe one direction from `position`.
pub fn probe_direction<M: MazeGrid + ?Sized>(
    position: Position,
    action: Action,
    maze: &M,
    visited: &VisitedGrid,
) -> DirectionProbe {
    if maze.is_border(position) {
        return DirectionProbe::BLOCKED;
    }

    let neighbour = position.offset(action);
    let visited = !maze.is_border(neighbour) && visited.is_visited(neighbour);

    let mut free_run = 0;
    let mut cursor = neighbour;
    while !maze.is_border(cursor) && maze.material_at(cursor).is_open() {
        free_run += 1;
        cursor = cursor.offset(action);
    }

    DirectionProbe {
        free_run,
        terminal: maze.material_at(cursor),
        visited,
    }
}

/// Compute the full feature vector for `position`.
pub fn compute_features<M: MazeGrid + ?Sized>(
    position: Position,
    maze: &M,
    visited: &VisitedGrid,
    goal: Position,
) -> FeatureVector {
    let mut values = [0.0; FEATURE_COUNT];
    for action in Action::ALL {
        let probe = probe_direction(position, action, maze, visited);
        let base = action.index() * FEATURES_PER_DIRECTION;
        values[base] = f64::from(probe.free_run);
        values[base + 1] = f64::from(probe.terminal.code());
        values[base + 2] = if probe.visited { 1.0 } else { 0.0 };
    }
    values[GOAL_DISTANCE_SLOT] = f64::from(position.manhattan_distance(goal));
    FeatureVector { values }
}
