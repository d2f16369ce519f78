//! Error types for the maze-learner crate

use thiserror::Error;

use crate::types::Position;

/// Main error type for the maze-learner crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("no valid move found from {position} after {attempts} attempts")]
    ExhaustedRetries { attempts: usize, position: Position },

    #[error("no agent store is configured")]
    PersistenceUnavailable,

    #[error("no episode is active (call init_episode first)")]
    NoActiveEpisode,

    #[error("position {position} is outside the {dimension}x{dimension} maze")]
    PositionOutOfBounds { position: Position, dimension: usize },

    #[error("invalid material code {code} at ({x}, {y}) (expected 0, 1 or 2)")]
    InvalidMaterial { code: u8, x: usize, y: usize },

    #[error("invalid maze: {message}")]
    InvalidMaze { message: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("no saved agent at slot {index}")]
    AgentNotFound { index: usize },

    #[error("unsupported agent save format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("saved agent is corrupt: {message}")]
    CorruptAgent { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

impl Error {
    /// Whether callers may recover by falling back to a freshly created agent.
    pub fn is_persistence_fallback(&self) -> bool {
        matches!(
            self,
            Error::PersistenceUnavailable | Error::AgentNotFound { .. }
        )
    }
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
