//! Configuration types for agent creation.

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    q_learning::{
        DEFAULT_DISCOUNT_FACTOR, DEFAULT_EXPLORATION_RATE, DEFAULT_LEARNING_RATE,
        DEFAULT_MAX_MOVE_ATTEMPTS,
    },
};

/// Configuration for creating a maze agent.
///
/// This type provides a type-safe, builder-style API for configuring agents
/// before creation through the dependency injection container.
///
/// # Examples
///
/// ```
/// use maze_learner::app::AgentConfig;
///
/// let config = AgentConfig::new()
///     .with_seed(42)
///     .with_exploration_rate(0.2)
///     .with_max_move_attempts(32);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Learning rate α
    pub learning_rate: f64,
    /// Discount factor γ
    pub discount_factor: f64,
    /// Probability of a random move while training
    pub exploration_rate: f64,
    /// Cap on tentative moves per step
    pub max_move_attempts: usize,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl AgentConfig {
    /// Create a configuration with the default hyperparameters:
    /// - Learning rate: 0.9
    /// - Discount factor: 0.8
    /// - Exploration rate: 0.4
    /// - Max move attempts: 64
    /// - Seed: None (non-deterministic)
    pub fn new() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            discount_factor: DEFAULT_DISCOUNT_FACTOR,
            exploration_rate: DEFAULT_EXPLORATION_RATE,
            max_move_attempts: DEFAULT_MAX_MOVE_ATTEMPTS,
            seed: None,
        }
    }

    pub fn with_learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = rate;
        self
    }

    pub fn with_discount_factor(mut self, factor: f64) -> Self {
        self.discount_factor = factor;
        self
    }

    pub fn with_exploration_rate(mut self, rate: f64) -> Self {
        self.exploration_rate = rate;
        self
    }

    pub fn with_max_move_attempts(mut self, attempts: usize) -> Self {
        self.max_move_attempts = attempts;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that every rate lies in `[0, 1]` and at least one move attempt
    /// is allowed.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("learning_rate", self.learning_rate),
            ("discount_factor", self.discount_factor),
            ("exploration_rate", self.exploration_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfiguration {
                    message: format!("{name} must be within [0, 1], got {value}"),
                });
            }
        }
        if self.max_move_attempts == 0 {
            return Err(Error::InvalidConfiguration {
                message: "max_move_attempts must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Load a configuration from a JSON file. Missing fields take their
    /// defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|source| Error::Io {
            operation: format!("open config {}", path.as_ref().display()),
            source,
        })?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.learning_rate, 0.9);
        assert_eq!(config.discount_factor, 0.8);
        assert_eq!(config.exploration_rate, 0.4);
        assert_eq!(config.max_move_attempts, 64);
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(AgentConfig::new().with_learning_rate(1.5).validate().is_err());
        assert!(AgentConfig::new().with_exploration_rate(-0.1).validate().is_err());
        assert!(AgentConfig::new().with_discount_factor(f64::NAN).validate().is_err());
        assert!(AgentConfig::new().with_max_move_attempts(0).validate().is_err());
    }

    #[test]
    fn test_from_json_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.json");
        std::fs::write(&path, r#"{ "exploration_rate": 0.1, "seed": 7 }"#).unwrap();

        let config = AgentConfig::from_json_file(&path).unwrap();
        assert_eq!(config.exploration_rate, 0.1);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.learning_rate, 0.9);
    }

    #[test]
    fn test_from_json_file_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.json");
        std::fs::write(&path, r#"{ "learning_rate": 2.0 }"#).unwrap();

        assert!(matches!(
            AgentConfig::from_json_file(&path),
            Err(Error::InvalidConfiguration { .. })
        ));
    }
}
