//! In-memory agent repository for testing.
//!
//! This adapter provides a pure in-memory implementation of AgentRepository,
//! enabling fast tests without any file system I/O.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{Result, error::Error, ports::AgentRepository, q_learning::SavedAgent};

/// In-memory repository for testing.
///
/// Stores encoded agents in memory using a shared map, avoiding file system
/// I/O entirely. Agents are still encoded to MessagePack so that a round
/// trip exercises the same serialization as the file-backed repository.
///
/// # Examples
///
/// ```
/// use maze_learner::adapters::InMemoryRepository;
/// use maze_learner::ports::AgentRepository;
/// use maze_learner::q_learning::{MazeAgent, SavedAgent};
///
/// let repo = InMemoryRepository::new();
/// let agent = MazeAgent::default().with_seed(1);
///
/// let slot = repo.save(&SavedAgent::from_agent(&agent))?;
/// let loaded = repo.load(slot)?.to_agent()?;
/// assert_eq!(loaded.q_table(), agent.q_table());
/// # Ok::<(), maze_learner::Error>(())
/// ```
///
/// # Thread Safety
///
/// This repository is thread-safe and can be safely cloned and shared across
/// threads. All clones share the same underlying storage.
#[derive(Clone)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<BTreeMap<usize, Vec<u8>>>>,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    fn storage(&self) -> MutexGuard<'_, BTreeMap<usize, Vec<u8>>> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the number of agents currently stored.
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    /// Clear all stored agents.
    pub fn clear(&self) {
        self.storage().clear();
    }

    /// Check if a slot is occupied.
    pub fn contains(&self, index: usize) -> bool {
        self.storage().contains_key(&index)
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentRepository for InMemoryRepository {
    fn save(&self, agent: &SavedAgent) -> Result<usize> {
        let bytes = agent.to_bytes()?;

        let mut storage = self.storage();
        let index = storage.keys().next_back().map_or(0, |last| last + 1);
        storage.insert(index, bytes);
        Ok(index)
    }

    fn load(&self, index: usize) -> Result<SavedAgent> {
        let storage = self.storage();
        let bytes = storage.get(&index).ok_or(Error::AgentNotFound { index })?;
        SavedAgent::from_bytes(bytes)
    }

    fn indices(&self) -> Result<Vec<usize>> {
        Ok(self.storage().keys().copied().collect())
    }
}
