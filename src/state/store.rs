use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{AppError, Result};

/// Contents of the local state file
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
struct StoredState {
    last_folder_path: Option<String>,
}

/// Durable local state that outlives a session.
///
/// Only the last folder path is kept. The file is stored in the user's data directory:
/// - Linux: ~/.local/share/image-labeler/state.json
/// - macOS: ~/Library/Application Support/image-labeler/state.json
/// - Windows: %APPDATA%\image-labeler\state.json
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Open the store at its default location
    pub fn open_default() -> Result<Self> {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| AppError::Config("could not determine user data directory".into()))?;

        path.push("image-labeler");
        path.push("state.json");
        Ok(Self::at(path))
    }

    /// Open a store backed by an explicit file
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the last used folder path, if any.
    /// A missing or unreadable file counts as empty.
    pub fn last_folder(&self) -> Option<String> {
        match self.read() {
            Ok(state) => state.last_folder_path,
            Err(e) => {
                warn!("Ignoring unreadable local state {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Remember the folder path for the next launch
    pub fn set_last_folder(&self, folder: &str) -> Result<()> {
        let state = StoredState {
            last_folder_path: Some(folder.to_string()),
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(&state)?)?;

        debug!("Saved last folder to {}", self.path.display());
        Ok(())
    }

    fn read(&self) -> Result<StoredState> {
        if !self.path.exists() {
            return Ok(StoredState::default());
        }
        let bytes = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
