//! Repository discovery

use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

/// Marker directory that identifies a repository root. It is also the root instruction scope.
pub const MARKER_DIR: &str = ".mango";

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("No mango repository found in {0} or any of its parents")]
    NotFound(PathBuf),
    #[error("Unknown working directory: {0}")]
    UnknownWorkingDirectory(String),
}

/// Whether `dir` carries the repository marker.
#[must_use]
pub fn is_repo(dir: &Path) -> bool {
    dir.join(MARKER_DIR).is_dir()
}

/// The root instruction scope of the repository rooted at `root`.
#[must_use]
pub fn scope_dir(root: &Path) -> PathBuf {
    root.join(MARKER_DIR)
}

/// Walk `start` and its ancestors until a directory carrying the marker is found.
///
/// # Errors
///
/// Returns `RepoError::NotFound` when the filesystem root is reached without a match.
pub fn find_repo(start: &Path) -> Result<PathBuf, RepoError> {
    debug!("Searching for mango repository from {}", start.display());
    let mut path = start.to_path_buf();
    loop {
        if is_repo(&path) {
            info!("Found mango repository: {}", path.display());
            return Ok(path);
        }
        if !path.pop() {
            return Err(RepoError::NotFound(start.to_path_buf()));
        }
    }
}

/// Find the closest repository starting at the current working directory.
///
/// # Errors
///
/// Returns `RepoError::UnknownWorkingDirectory` if the cwd cannot be determined,
/// or `RepoError::NotFound` if no ancestor is a repository.
pub fn closest_repo() -> Result<PathBuf, RepoError> {
    let cwd =
        std::env::current_dir().map_err(|e| RepoError::UnknownWorkingDirectory(e.to_string()))?;
    find_repo(&cwd)
}
