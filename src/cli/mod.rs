//! CLI infrastructure for the maze-learner binary
//!
//! This module provides the command-line interface for training and
//! evaluating maze agents.

pub mod commands;
pub mod config;
pub mod output;
