//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events,
//! allowing composable data collection without coupling training
//! logic to specific output formats or metrics.

use crate::{
    Result,
    pipeline::{EpisodeReport, EpisodeSetup, StepObservation},
};

/// Observer trait for monitoring training
///
/// Observers can be composed to collect different types of data during training.
/// Examples include:
/// - Progress bars for user feedback
/// - JSONL and CSV export for analysis
/// - Metrics tracking for evaluation
///
/// # Event Sequence
///
/// The observer methods are called in the following order:
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. For each episode:
///    - `on_episode_start(setup)`
///    - `on_step(step)` - For each accepted move
///    - `on_episode_end(report)`
/// 3. `on_training_end()` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use maze_learner::{pipeline::EpisodeReport, ports::Observer};
///
/// struct GoalCounter {
///     goals: usize,
/// }
///
/// impl Observer for GoalCounter {
///     fn on_episode_end(&mut self, report: &EpisodeReport) -> maze_learner::Result<()> {
///         if report.reached_goal() {
///             self.goals += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called when training starts.
    ///
    /// # Parameters
    ///
    /// * `total_episodes` - Number of episodes that will be played
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called before the first move of an episode.
    fn on_episode_start(&mut self, _setup: &EpisodeSetup) -> Result<()> {
        Ok(())
    }

    /// Called after every accepted move.
    ///
    /// Rejected tentative moves are not reported.
    fn on_step(&mut self, _step: &StepObservation) -> Result<()> {
        Ok(())
    }

    /// Called once the agent's episode has been closed.
    fn on_episode_end(&mut self, _report: &EpisodeReport) -> Result<()> {
        Ok(())
    }

    /// Called when training completes.
    ///
    /// Use this to finalize outputs, close files, or display summaries.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
