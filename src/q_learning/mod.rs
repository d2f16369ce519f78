//! Tabular Q-learning for grid mazes
//!
//! The agent observes a 13-bit state built from local features, chooses among
//! four moves ε-greedily and updates a dense Q-table after every tentative
//! move:
//!
//! Q(s,a) ← (1-α)·Q(s,a) + α·(r + γ·max_a' Q(s',a'))
//!
//! ## Rewards
//!
//! | Arrival cell           | Reward |
//! |------------------------|--------|
//! | goal                   | 100    |
//! | outer ring (not goal)  | -100   |
//! | open road              | -1     |
//! | soft obstacle          | -5     |
//! | wall                   | -20    |
//!
//! ## Usage Example
//!
//! ```no_run
//! use maze_learner::{
//!     maze::Maze,
//!     q_learning::MazeAgent,
//!     types::Position,
//! };
//!
//! let maze = Maze::walled(11);
//! let mut agent = MazeAgent::new(
//!     0.9, // learning_rate
//!     0.8, // discount_factor
//!     0.4, // exploration_rate
//! )
//! .with_seed(42);
//!
//! agent.init_episode(&maze, Position::new(1, 1), Position::new(10, 9))?;
//! let action = agent.step(true)?;
//! println!("moved {action}");
//! # Ok::<(), maze_learner::Error>(())
//! ```

pub mod agent;
pub mod episode;
pub mod q_table;
pub mod serialization;

// Public re-exports
pub use agent::{
    DEFAULT_DISCOUNT_FACTOR, DEFAULT_EXPLORATION_RATE, DEFAULT_LEARNING_RATE,
    DEFAULT_MAX_MOVE_ATTEMPTS, EpisodeSummary, MazeAgent,
};
pub use episode::{Episode, EpisodePhase};
pub use q_table::QTable;
pub use serialization::SavedAgent;
