//! Repository port for agent persistence.
//!
//! This module defines the trait boundary between the domain and infrastructure
//! layers for storing and retrieving trained agents.

use crate::{Result, q_learning::SavedAgent};

/// Port for persisting and loading saved agents by slot index.
///
/// Slots are small non-negative integers handed out by the repository on
/// save. Implementations pick the next slot as one past the highest slot in
/// use, starting from 0.
///
/// # Examples
///
/// ```no_run
/// use maze_learner::ports::AgentRepository;
/// use maze_learner::q_learning::{MazeAgent, SavedAgent};
///
/// fn checkpoint<R: AgentRepository>(
///     repo: &R,
///     agent: &MazeAgent,
/// ) -> maze_learner::Result<usize> {
///     repo.save(&SavedAgent::from_agent(agent))
/// }
/// ```
pub trait AgentRepository: Send + Sync {
    /// Store an agent in a new slot and return that slot's index.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Serialization fails
    /// - The underlying storage cannot be written
    fn save(&self, agent: &SavedAgent) -> Result<usize>;

    /// Load the agent stored in slot `index`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::AgentNotFound`] if the slot is empty, or an
    /// error if the stored bytes cannot be read or decoded.
    fn load(&self, index: usize) -> Result<SavedAgent>;

    /// Occupied slot indices in ascending order.
    fn indices(&self) -> Result<Vec<usize>>;

    /// Index of the most recently added slot, if any.
    fn latest(&self) -> Result<Option<usize>> {
        Ok(self.indices()?.last().copied())
    }
}
