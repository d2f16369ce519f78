//! MessagePack implementation of the agent repository.
//!
//! This adapter implements the AgentRepository port using rmp_serde for
//! compact binary serialization, one file per slot.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{Result, error::Error, ports::AgentRepository, q_learning::SavedAgent};

const FILE_PREFIX: &str = "agent-";
const FILE_EXTENSION: &str = "msgpack";

/// MessagePack-based agent repository.
///
/// Slot `n` lives in `<dir>/agent-NNNN.msgpack`. The directory is created on
/// first save.
///
/// # Examples
///
/// ```no_run
/// use maze_learner::adapters::MsgPackRepository;
/// use maze_learner::ports::AgentRepository;
/// use maze_learner::q_learning::{MazeAgent, SavedAgent};
///
/// let repo = MsgPackRepository::new("agents");
/// let agent = MazeAgent::default();
///
/// let slot = repo.save(&SavedAgent::from_agent(&agent))?;
/// let restored = repo.load(slot)?.to_agent()?;
/// # Ok::<(), maze_learner::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct MsgPackRepository {
    dir: PathBuf,
}

impl MsgPackRepository {
    /// Create a repository rooted at `dir`.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds slot `index`.
    pub fn slot_path(&self, index: usize) -> PathBuf {
        self.dir
            .join(format!("{FILE_PREFIX}{index:04}.{FILE_EXTENSION}"))
    }

    fn parse_slot(file_name: &str) -> Option<usize> {
        file_name
            .strip_prefix(FILE_PREFIX)?
            .strip_suffix(FILE_EXTENSION)?
            .strip_suffix('.')?
            .parse()
            .ok()
    }
}

impl AgentRepository for MsgPackRepository {
    fn save(&self, agent: &SavedAgent) -> Result<usize> {
        fs::create_dir_all(&self.dir).map_err(|source| Error::Io {
            operation: format!("create directory {}", self.dir.display()),
            source,
        })?;

        let index = self.latest()?.map_or(0, |last| last + 1);
        agent.save_to_file(self.slot_path(index))?;
        Ok(index)
    }

    fn load(&self, index: usize) -> Result<SavedAgent> {
        let path = self.slot_path(index);
        if !path.is_file() {
            return Err(Error::AgentNotFound { index });
        }
        SavedAgent::load_from_file(path)
    }

    fn indices(&self) -> Result<Vec<usize>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.dir).map_err(|source| Error::Io {
            operation: format!("read directory {}", self.dir.display()),
            source,
        })?;

        let mut indices = Vec::new();
        for entry in entries {
            let entry = entry?;
            if let Some(index) = entry.file_name().to_str().and_then(Self::parse_slot) {
                indices.push(index);
            }
        }
        indices.sort_unstable();
        Ok(indices)
    }
}
