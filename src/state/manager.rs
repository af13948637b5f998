//! State manager implementation
//!
//! Loads the incoming state document and, when an output path is set,
//! writes the current state to disk at every checkpoint with atomic writes.

use super::types::State;
use crate::error::{Error, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Holds the run's state document and persists checkpoints
#[derive(Debug, Clone, Default)]
pub struct StateManager {
    /// Current state
    state: State,
    /// Where checkpoints are written, if anywhere
    output: Option<PathBuf>,
}

impl StateManager {
    /// Create a state manager around an already-migrated state
    pub fn new(state: State) -> Self {
        Self {
            state,
            output: None,
        }
    }

    /// Write checkpoints to `path` as well
    #[must_use]
    pub fn with_output(mut self, path: impl AsRef<Path>) -> Self {
        self.output = Some(path.as_ref().to_path_buf());
        self
    }

    /// Read a raw state document from disk
    ///
    /// A missing or empty file is an empty state, not an error.
    pub fn read_raw_file(path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Value::Object(serde_json::Map::new()));
        }
        let contents = std::fs::read_to_string(path).map_err(|e| Error::State {
            message: format!("Failed to read state file: {e}"),
        })?;
        Self::parse_raw(&contents)
    }

    /// Parse a raw state document from a JSON string
    pub fn parse_raw(json: &str) -> Result<Value> {
        if json.trim().is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }
        let value: Value = serde_json::from_str(json).map_err(|e| Error::State {
            message: format!("Failed to parse state JSON: {e}"),
        })?;
        if !(value.is_object() || value.is_null()) {
            return Err(Error::state("State document must be a JSON object"));
        }
        Ok(value)
    }

    /// The current state
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Mutable access to the current state
    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    /// Consume the manager, returning the state
    pub fn into_state(self) -> State {
        self.state
    }

    /// Checkpoint output path, if any
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Export state as JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.state).map_err(|e| Error::State {
            message: format!("Failed to serialize state: {e}"),
        })
    }

    /// Write the current state to the output path
    pub async fn checkpoint(&self) -> Result<()> {
        let Some(path) = &self.output else {
            return Ok(());
        };

        let contents = serde_json::to_string_pretty(&self.state).map_err(|e| Error::State {
            message: format!("Failed to serialize state: {e}"),
        })?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::State {
                message: format!("Failed to write state file: {e}"),
            })?;

        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| Error::State {
                message: format!("Failed to rename state file: {e}"),
            })?;

        Ok(())
    }
}
