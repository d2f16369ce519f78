//! Serialization support for maze agents.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    q_learning::agent::{AgentState, MazeAgent},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAgent {
    pub version: u32,
    state: AgentState,
}

impl SavedAgent {
    pub const VERSION: u32 = 2;

    pub fn from_agent(agent: &MazeAgent) -> Self {
        Self {
            version: Self::VERSION,
            state: agent.export_state(),
        }
    }

    pub fn training_round(&self) -> u64 {
        self.state.training_round
    }

    pub fn to_agent(&self) -> Result<MazeAgent> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }

        if !self.state.q_table.has_full_shape() {
            return Err(Error::CorruptAgent {
                message: format!("Q-table has {} rows", self.state.q_table.len()),
            });
        }

        Ok(MazeAgent::from_state(self.state.clone()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec(self).map_err(|e| Error::SerializationContext {
            operation: "serialize agent".to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        rmp_serde::from_slice(bytes).map_err(|e| Error::SerializationContext {
            operation: "deserialize agent".to_string(),
            message: e.to_string(),
        })
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref()).map_err(|source| Error::Io {
            operation: format!("create file {}", path.as_ref().display()),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write(&mut writer, self).map_err(|e| Error::SerializationContext {
            operation: "serialize agent".to_string(),
            message: e.to_string(),
        })
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|source| Error::Io {
            operation: format!("open file {}", path.as_ref().display()),
            source,
        })?;
        let reader = BufReader::new(file);

        rmp_serde::decode::from_read(reader).map_err(|e| Error::SerializationContext {
            operation: format!("deserialize agent from {}", path.as_ref().display()),
            message: e.to_string(),
        })
    }
}
