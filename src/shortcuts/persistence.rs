//! Persistence for user shortcut overrides.
//!
//! The manager only needs `get` and `set`; where the state actually lives is
//! up to the host. `JsonFileStore` keeps it in `~/.storybook/shortcuts.json`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::types::Shortcuts;
use crate::error::{Result, StorybookError};

/// How long a `set` should last.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Persistence {
    /// Kept for this session only.
    Session,
    /// Written to the backing store.
    Permanent,
}

/// Persisted manager state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcuts: Option<Shortcuts>,
}

pub trait StateStore: Send {
    fn get(&self) -> Result<PersistedState>;
    fn set(&mut self, state: PersistedState, persistence: Persistence) -> Result<()>;
}

/// In-memory store. Counts permanent writes so callers can check them.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    state: PersistedState,
    pub permanent_writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state,
            permanent_writes: 0,
        }
    }
}

impl StateStore for MemoryStore {
    fn get(&self) -> Result<PersistedState> {
        Ok(self.state.clone())
    }

    fn set(&mut self, state: PersistedState, persistence: Persistence) -> Result<()> {
        if persistence == Persistence::Permanent {
            self.permanent_writes += 1;
        }
        self.state = state;
        Ok(())
    }
}

/// JSON file store. Session-only state shadows the file until the next
/// permanent write.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    session: Option<PersistedState>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            session: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<PersistedState> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No persisted shortcuts, using defaults");
            return Ok(PersistedState::default());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| StorybookError::Io {
            path: self.path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| {
            StorybookError::Persistence(format!("{}: {}", self.path.display(), e))
        })
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorybookError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        let content = serde_json::to_string_pretty(state)
            .map_err(|e| StorybookError::Persistence(e.to_string()))?;
        fs::write(&self.path, content).map_err(|e| StorybookError::Io {
            path: self.path.display().to_string(),
            source: e,
        })?;
        info!(path = %self.path.display(), "Saved shortcuts");
        Ok(())
    }
}

impl StateStore for JsonFileStore {
    fn get(&self) -> Result<PersistedState> {
        match &self.session {
            Some(state) => Ok(state.clone()),
            None => self.load(),
        }
    }

    fn set(&mut self, state: PersistedState, persistence: Persistence) -> Result<()> {
        match persistence {
            Persistence::Session => {
                self.session = Some(state);
                Ok(())
            }
            Persistence::Permanent => {
                self.save(&state)?;
                self.session = None;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcuts::{Action, KeyCollection};
    use tempfile::TempDir;

    fn state_with_toolbar(key: &str) -> PersistedState {
        let mut shortcuts = Shortcuts::new();
        shortcuts.set(Action::Toolbar.into(), KeyCollection::from_iter([key.to_string()]));
        PersistedState {
            shortcuts: Some(shortcuts),
        }
    }

    #[test]
    fn test_missing_file_is_empty_state() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("shortcuts.json"));
        assert_eq!(store.get().unwrap(), PersistedState::default());
    }

    #[test]
    fn test_permanent_set_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("shortcuts.json");
        let mut store = JsonFileStore::new(&path);
        store
            .set(state_with_toolbar("Y"), Persistence::Permanent)
            .unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get().unwrap(), state_with_toolbar("Y"));
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"toolbar\""));
    }

    #[test]
    fn test_session_set_does_not_touch_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shortcuts.json");
        let mut store = JsonFileStore::new(&path);
        store
            .set(state_with_toolbar("Y"), Persistence::Session)
            .unwrap();

        assert_eq!(store.get().unwrap(), state_with_toolbar("Y"));
        assert!(!path.exists());
    }

    #[test]
    fn test_malformed_file_is_persistence_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shortcuts.json");
        fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::new(&path).get().unwrap_err();
        assert!(matches!(err, StorybookError::Persistence(_)));
    }

    #[test]
    fn test_memory_store_counts_permanent_writes() {
        let mut store = MemoryStore::new();
        store
            .set(state_with_toolbar("Y"), Persistence::Session)
            .unwrap();
        store
            .set(state_with_toolbar("Z"), Persistence::Permanent)
            .unwrap();
        assert_eq!(store.permanent_writes, 1);
        assert_eq!(store.get().unwrap(), state_with_toolbar("Z"));
    }
}
