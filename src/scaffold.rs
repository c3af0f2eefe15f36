//! Repository scaffolding and removal

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use crate::instructions::INSTRUCTIONS_FILE;
use crate::repo::{self, MARKER_DIR};
use crate::submodule::SUBMODULES_DIR;

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("mango repository already exists at {0} (use --force to complete it)")]
    AlreadyExists(PathBuf),

    #[error("no mango repository at {0}")]
    NotARepository(PathBuf),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove {} of the entries under {root}", .failures.len())]
    Partial {
        root: PathBuf,
        failures: Vec<(PathBuf, std::io::Error)>,
    },
}

const INSTRUCTIONS_TEMPLATE: &str = "\
# mango instructions
#
#   script.sh: name           run script.sh as `mango name`
#   *env.sh: name             source env.sh instead of executing it
#   [sub] *                   export every command of submodule `sub`
#   [sub] old: new1 new2      expose `old` from `sub` as `new1` and `new2`
";

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ScaffoldError + '_ {
    move |source| ScaffoldError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Create a repository in `dir`: the marker scope, a commented instruction file and an
/// empty submodule container.
///
/// With `force`, an existing repository gets any missing pieces; nothing that exists is
/// overwritten.
///
/// # Errors
///
/// Returns `ScaffoldError::AlreadyExists` if `dir` is already a repository and `force` is
/// not set, or `ScaffoldError::Io` on write failure.
pub fn init_repo(dir: &Path, force: bool) -> Result<PathBuf, ScaffoldError> {
    if repo::is_repo(dir) && !force {
        return Err(ScaffoldError::AlreadyExists(dir.to_path_buf()));
    }
    let scope = repo::scope_dir(dir);
    let submodules = scope.join(SUBMODULES_DIR);
    std::fs::create_dir_all(&submodules).map_err(io_err(&submodules))?;

    let instructions = scope.join(INSTRUCTIONS_FILE);
    if instructions.exists() {
        debug!("Keeping existing {}", instructions.display());
    } else {
        std::fs::write(&instructions, INSTRUCTIONS_TEMPLATE).map_err(io_err(&instructions))?;
    }
    info!("Initialized mango repository at {}", dir.display());
    Ok(scope)
}

/// Delete the repository marker scope under `root`, with everything in it.
///
/// # Errors
///
/// Returns `ScaffoldError::NotARepository` if `root` has no marker, otherwise as
/// `remove_tree`.
pub fn remove_repo(root: &Path) -> Result<(), ScaffoldError> {
    if !repo::is_repo(root) {
        return Err(ScaffoldError::NotARepository(root.to_path_buf()));
    }
    remove_tree(&root.join(MARKER_DIR))
}

/// Delete `path` depth-first. Entries that fail are collected and the walk carries on.
///
/// # Errors
///
/// Returns `ScaffoldError::Partial` listing every entry that could not be removed.
pub fn remove_tree(path: &Path) -> Result<(), ScaffoldError> {
    let mut failures = Vec::new();
    remove_entry(path, &mut failures);
    if failures.is_empty() {
        Ok(())
    } else {
        Err(ScaffoldError::Partial {
            root: path.to_path_buf(),
            failures,
        })
    }
}

fn remove_entry(path: &Path, failures: &mut Vec<(PathBuf, std::io::Error)>) {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            failures.push((path.to_path_buf(), e));
            return;
        }
    };
    if !metadata.is_dir() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Unable to remove {}: {e}", path.display());
            failures.push((path.to_path_buf(), e));
        }
        return;
    }
    match std::fs::read_dir(path) {
        Ok(entries) => {
            for entry in entries {
                match entry {
                    Ok(entry) => remove_entry(&entry.path(), failures),
                    Err(e) => failures.push((path.to_path_buf(), e)),
                }
            }
        }
        Err(e) => {
            failures.push((path.to_path_buf(), e));
            return;
        }
    }
    if let Err(e) = std::fs::remove_dir(path) {
        warn!("Unable to remove {}: {e}", path.display());
        failures.push((path.to_path_buf(), e));
    }
}
