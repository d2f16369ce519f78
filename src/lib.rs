//! Tabular Q-learning agent for procedurally generated grid mazes
//!
//! This crate provides:
//! - A maze model with open road, soft obstacles and walls, plus a seeded
//!   maze generator
//! - Local feature extraction and a 13-bit state encoding
//! - A Q-learning agent with ε-greedy exploration and capped move retries
//! - A simulated game loop, training pipeline and observers
//! - Slot-based agent persistence in MessagePack

pub mod adapters;
pub mod app;
pub mod cli;
pub mod error;
pub mod features;
pub mod maze;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod state;
pub mod types;

pub use error::{Error, Result};
pub use maze::{Maze, MazeGrid};
pub use q_learning::{MazeAgent, SavedAgent};
pub use types::{Action, Material, Position};
