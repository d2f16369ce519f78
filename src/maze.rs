//! Maze model consumed by the agent
//!
//! The agent only needs read access to cell materials; [`MazeGrid`] is the
//! boundary to whatever produces the maze. [`Maze`] is the dense snapshot the
//! agent keeps for the duration of an episode.

pub mod generator;
pub mod grid;
pub mod visited;

pub use generator::{MazeGenerator, default_goal, default_start};
pub use grid::{Maze, MazeGrid};
pub use visited::VisitedGrid;
