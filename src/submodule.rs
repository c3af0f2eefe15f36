//! Submodule addressing
//!
//! A submodule chain such as `alpha:beta` names a scope reached by descending one
//! `.submodules` container per segment.

use std::path::{Path, PathBuf};

use log::trace;
use thiserror::Error;

use crate::repo::MARKER_DIR;

/// Name of the submodule container inside a scope.
pub const SUBMODULES_DIR: &str = ".submodules";

/// Separator between submodule names in a command address.
pub const SEPARATOR: char = ':';

#[derive(Error, Debug)]
pub enum SubmoduleError {
    #[error("Submodule `{segment}` of `{chain}` not found: {path}")]
    NotFound {
        chain: String,
        segment: String,
        path: PathBuf,
    },
    #[error("Invalid submodule name `{segment}` in `{chain}`")]
    InvalidName { chain: String, segment: String },
}

/// Split `sub1:sub2:name` into the submodule chain (`sub1:sub2`) and the bare name.
///
/// A command without a separator has an empty chain.
#[must_use]
pub fn split_command_name(command: &str) -> (&str, &str) {
    command.rsplit_once(SEPARATOR).unwrap_or(("", command))
}

/// Whether `segment` names a directory directly inside a submodule container.
fn is_valid_name(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.chars().any(std::path::is_separator)
}

/// One hop down: the scope of submodule `segment` of `scope`.
///
/// A submodule that is itself a full repository keeps its instructions under its own
/// marker directory, which then becomes the scope.
fn descend(scope: &Path, segment: &str, chain: &str) -> Result<PathBuf, SubmoduleError> {
    if !is_valid_name(segment) {
        return Err(SubmoduleError::InvalidName {
            chain: chain.to_string(),
            segment: segment.to_string(),
        });
    }
    let path = scope.join(SUBMODULES_DIR).join(segment);
    if !path.is_dir() {
        return Err(SubmoduleError::NotFound {
            chain: chain.to_string(),
            segment: segment.to_string(),
            path,
        });
    }
    let nested = path.join(MARKER_DIR);
    if nested.is_dir() {
        return Ok(nested);
    }
    Ok(path)
}

/// Resolve a colon-delimited submodule chain starting at `scope`.
///
/// An empty chain addresses `scope` itself.
///
/// # Errors
///
/// Returns `SubmoduleError::InvalidName` on a segment that is empty, `.`, `..` or contains a
/// path separator, and `SubmoduleError::NotFound` on the first segment that does not exist.
pub fn map_submodule_path(scope: &Path, chain: &str) -> Result<PathBuf, SubmoduleError> {
    let mut current = scope.to_path_buf();
    if chain.is_empty() {
        return Ok(current);
    }
    for segment in chain.split(SEPARATOR) {
        current = descend(&current, segment, chain)?;
        trace!("Submodule `{segment}` -> {}", current.display());
    }
    Ok(current)
}

/// Names of the submodules directly under `scope`, sorted.
///
/// # Errors
///
/// Returns an IO error if the container exists but cannot be listed.
pub fn list_submodules(scope: &Path) -> std::io::Result<Vec<String>> {
    let container = scope.join(SUBMODULES_DIR);
    if !container.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(container)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command_without_submodule() {
        assert_eq!(split_command_name("script"), ("", "script"));
    }

    #[test]
    fn test_split_command_nested_path() {
        assert_eq!(split_command_name("sub1:sub2:script"), ("sub1:sub2", "script"));
        assert_eq!(split_command_name("a:b:c"), ("a:b", "c"));
    }

    #[test]
    fn test_map_submodule_path() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir
            .path()
            .join(SUBMODULES_DIR)
            .join("alpha")
            .join(SUBMODULES_DIR)
            .join("beta");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(map_submodule_path(dir.path(), "alpha:beta").unwrap(), nested);
    }

    #[test]
    fn test_map_submodule_path_empty_chain() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(map_submodule_path(dir.path(), "").unwrap(), dir.path());
    }

    #[test]
    fn test_map_submodule_path_missing() {
        let dir = tempfile::tempdir().unwrap();
        match map_submodule_path(dir.path(), "missing").unwrap_err() {
            SubmoduleError::NotFound { segment, .. } => assert_eq!(segment, "missing"),
            other => panic!("Expected NotFound, got: {other:?}"),
        }
    }

    #[test]
    fn test_map_submodule_path_missing_last_segment() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(SUBMODULES_DIR).join("alpha")).unwrap();
        match map_submodule_path(dir.path(), "alpha:beta").unwrap_err() {
            SubmoduleError::NotFound { chain, segment, .. } => {
                assert_eq!(chain, "alpha:beta");
                assert_eq!(segment, "beta");
            }
            other => panic!("Expected NotFound, got: {other:?}"),
        }
    }

    #[test]
    fn test_submodule_with_own_marker() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir
            .path()
            .join(SUBMODULES_DIR)
            .join("tools")
            .join(MARKER_DIR);
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(map_submodule_path(dir.path(), "tools").unwrap(), nested);
    }

    #[test]
    fn test_map_submodule_path_rejects_path_like_segments() {
        let dir = tempfile::tempdir().unwrap();
        let scope = dir.path().join("scope");
        std::fs::create_dir_all(scope.join(SUBMODULES_DIR).join("alpha")).unwrap();
        std::fs::create_dir_all(dir.path().join("outside")).unwrap();
        for chain in ["..", ".", "..:alpha", "alpha:", "alpha:..", "../../outside"] {
            match map_submodule_path(&scope, chain) {
                Err(SubmoduleError::InvalidName { chain: reported, .. }) => {
                    assert_eq!(reported, chain);
                }
                other => panic!("Expected InvalidName for `{chain}`, got: {other:?}"),
            }
        }
    }

    #[test]
    fn test_list_submodules_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zeta", "alpha"] {
            std::fs::create_dir_all(dir.path().join(SUBMODULES_DIR).join(name)).unwrap();
        }
        std::fs::write(dir.path().join(SUBMODULES_DIR).join("file"), "").unwrap();
        assert_eq!(list_submodules(dir.path()).unwrap(), vec!["alpha", "zeta"]);
    }
}
