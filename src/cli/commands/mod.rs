//! Subcommands of the `maze-learner` binary

pub mod evaluate;
pub mod train;
