/// Folder loader
///
/// Validates the folder path typed by the operator and applies the
/// server's image list to the session.

use thiserror::Error;
use tracing::{info, warn};

use crate::state::session::Session;
use crate::ui::status::Status;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Please enter a folder path")]
    EmptyPath,
}

/// Trim the input and reject an empty path before any network call
pub fn validate(input: &str) -> Result<String, LoadError> {
    let folder = input.trim();
    if folder.is_empty() {
        return Err(LoadError::EmptyPath);
    }
    Ok(folder.to_string())
}

/// What applying a load result did to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Session replaced with this many images
    Loaded(usize),
    /// Server found nothing; session is now inactive
    Empty,
    /// Request failed; session untouched
    Failed(String),
}

impl LoadOutcome {
    pub fn status(&self) -> Status {
        match self {
            LoadOutcome::Loaded(1) => Status::success("Loaded 1 image"),
            LoadOutcome::Loaded(count) => Status::success(format!("Loaded {} images", count)),
            LoadOutcome::Empty => Status::warning("No image files found in the folder"),
            LoadOutcome::Failed(e) => Status::warning(format!("Failed to load: {}", e)),
        }
    }
}

/// Apply a finished `list_images` call to the session
pub fn apply(session: &mut Session, folder: &str, result: Result<Vec<String>, String>) -> LoadOutcome {
    match result {
        Ok(images) if images.is_empty() => {
            warn!("No images in {}", folder);
            session.load(images);
            LoadOutcome::Empty
        }
        Ok(images) => {
            let count = images.len();
            info!("Loaded {} images from {}", count, folder);
            session.load(images);
            LoadOutcome::Loaded(count)
        }
        Err(e) => {
            warn!("Loading {} failed: {}", folder, e);
            LoadOutcome::Failed(e)
        }
    }
}
