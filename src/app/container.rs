//! Dependency injection container for the maze-learner application.
//!
//! This module provides centralized dependency management following hexagonal
//! architecture principles. The container owns infrastructure dependencies and
//! provides factory methods for creating domain objects.

use std::{path::PathBuf, sync::Arc};

use super::config::AgentConfig;
use crate::{
    Error, Result,
    adapters::MsgPackRepository,
    ports::AgentRepository,
    q_learning::{MazeAgent, SavedAgent},
};

/// Application with dependency injection.
///
/// The agent store is optional: an app without one can still create and train
/// agents, but saving reports [`Error::PersistenceUnavailable`].
///
/// # Examples
///
/// ## Production usage
///
/// ```no_run
/// use maze_learner::app::{AgentConfig, App};
///
/// let app = App::with_store("agents");
/// let agent = app.create_agent(AgentConfig::new().with_seed(42))?;
/// let slot = app.save_agent(&agent)?;
/// # Ok::<(), maze_learner::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use maze_learner::app::App;
/// use maze_learner::adapters::InMemoryRepository;
///
/// let app = App::for_testing()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct App {
    /// Repository for agent persistence
    agent_repository: Option<Arc<dyn AgentRepository>>,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create an app with no agent store.
    pub fn new() -> Self {
        Self {
            agent_repository: None,
            default_seed: None,
        }
    }

    /// Create an app that stores agents as MessagePack files under `dir`.
    pub fn with_store<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            agent_repository: Some(Arc::new(MsgPackRepository::new(dir))),
            default_seed: None,
        }
    }

    /// Create a builder for constructing app with custom dependencies.
    ///
    /// Primarily used for testing with mock/in-memory dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    /// Get the agent repository, if one is configured.
    ///
    /// Returns an Arc-wrapped repository that can be shared across threads.
    pub fn agent_repository(&self) -> Option<Arc<dyn AgentRepository>> {
        self.agent_repository.as_ref().map(Arc::clone)
    }

    fn repository(&self) -> Result<&dyn AgentRepository> {
        self.agent_repository
            .as_deref()
            .ok_or(Error::PersistenceUnavailable)
    }

    /// Create a new agent with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the configuration does not
    /// validate.
    pub fn create_agent(&self, config: AgentConfig) -> Result<MazeAgent> {
        config.validate()?;

        let mut agent = MazeAgent::new(
            config.learning_rate,
            config.discount_factor,
            config.exploration_rate,
        )
        .with_max_move_attempts(config.max_move_attempts);

        // Apply seed from config or use container default
        if let Some(seed) = config.seed.or(self.default_seed) {
            agent = agent.with_seed(seed);
        }

        Ok(agent)
    }

    /// Save an agent to a new slot and return the slot index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PersistenceUnavailable`] if no store is configured.
    pub fn save_agent(&self, agent: &MazeAgent) -> Result<usize> {
        self.repository()?.save(&SavedAgent::from_agent(agent))
    }

    /// Load the agent stored in slot `index`.
    ///
    /// # Errors
    ///
    /// * [`Error::PersistenceUnavailable`] if no store is configured.
    /// * [`Error::AgentNotFound`] if the slot is empty.
    pub fn load_agent(&self, index: usize) -> Result<MazeAgent> {
        self.repository()?.load(index)?.to_agent()
    }

    /// Load the agent in slot `index`, or create a fresh one from `config`
    /// when the store is missing or the slot is empty.
    ///
    /// Other load failures (corrupt files, version mismatch) are returned.
    pub fn load_or_create(&self, index: usize, config: AgentConfig) -> Result<MazeAgent> {
        match self.load_agent(index) {
            Ok(agent) => Ok(agent),
            Err(err) if err.is_persistence_fallback() => {
                eprintln!("Warning: {err}; starting with a fresh agent.");
                self.create_agent(config)
            }
            Err(err) => Err(err),
        }
    }

    /// Occupied slot indices, or an empty list without a store.
    pub fn saved_indices(&self) -> Result<Vec<usize>> {
        match &self.agent_repository {
            Some(repository) => repository.indices(),
            None => Ok(Vec::new()),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing app with custom dependencies.
///
/// Primarily used for testing to inject mock repositories and control randomness.
///
/// # Examples
///
/// ```
/// use maze_learner::app::AppBuilder;
/// use maze_learner::adapters::InMemoryRepository;
///
/// let app = AppBuilder::new()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct AppBuilder {
    agent_repository: Option<Arc<dyn AgentRepository>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    /// Create a new app builder.
    pub fn new() -> Self {
        Self {
            agent_repository: None,
            default_seed: None,
        }
    }

    /// Set a custom agent repository.
    pub fn with_repository<R: AgentRepository + 'static>(mut self, repo: R) -> Self {
        self.agent_repository = Some(Arc::new(repo));
        self
    }

    /// Set a default random seed for all agents created by this container.
    ///
    /// Useful for creating deterministic tests.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Build the app with the configured dependencies.
    ///
    /// If no repository was specified, the app has no store.
    pub fn build(self) -> App {
        App {
            agent_repository: self.agent_repository,
            default_seed: self.default_seed,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryRepository;

    #[test]
    fn test_app_creates_agent() {
        let app = App::new();
        let agent = app.create_agent(AgentConfig::new()).unwrap();
        assert_eq!(agent.exploration_rate(), 0.4);
        assert_eq!(agent.training_round(), 0);
    }

    #[test]
    fn test_app_applies_default_seed() {
        let app = App::for_testing().with_default_seed(42).build();

        let a = app.create_agent(AgentConfig::new()).unwrap();
        let b = app.create_agent(AgentConfig::new()).unwrap();
        assert_eq!(a.rng_seed(), Some(42));
        assert_eq!(a.q_table(), b.q_table());
    }

    #[test]
    fn test_config_seed_overrides_app_default() {
        let app = App::for_testing().with_default_seed(42).build();
        let agent = app.create_agent(AgentConfig::new().with_seed(123)).unwrap();
        assert_eq!(agent.rng_seed(), Some(123));
    }

    #[test]
    fn test_save_without_store_is_unavailable() {
        let app = App::new();
        let agent = app.create_agent(AgentConfig::new()).unwrap();
        assert!(matches!(
            app.save_agent(&agent),
            Err(Error::PersistenceUnavailable)
        ));
        assert!(matches!(
            app.load_agent(0),
            Err(Error::PersistenceUnavailable)
        ));
    }

    #[test]
    fn test_load_or_create_falls_back() {
        let app = App::for_testing()
            .with_repository(InMemoryRepository::new())
            .build();
        let agent = app
            .load_or_create(3, AgentConfig::new().with_seed(5))
            .unwrap();
        assert_eq!(agent.training_round(), 0);
        assert_eq!(agent.rng_seed(), Some(5));

        let app = App::new();
        assert!(app.load_or_create(0, AgentConfig::new()).is_ok());
    }

    #[test]
    fn test_save_then_load() {
        let app = App::for_testing()
            .with_repository(InMemoryRepository::new())
            .with_default_seed(1)
            .build();
        let agent = app.create_agent(AgentConfig::new()).unwrap();

        let slot = app.save_agent(&agent).unwrap();
        let loaded = app.load_agent(slot).unwrap();
        assert_eq!(loaded.q_table(), agent.q_table());
        assert_eq!(app.saved_indices().unwrap(), vec![slot]);
    }
}
