//! Binding resolution
//!
//! Resolution scans a scope's directives top to bottom and keeps the last candidate
//! found for the requested name, so a later line shadows an earlier one. Export and
//! rebind directives recurse into the submodule they name.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use log::{debug, trace, warn};
use thiserror::Error;

use crate::instructions::{self, Directive, InstructionError};
use crate::submodule::{self, SubmoduleError};

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Command `{command}` not found in {scope}")]
    CommandNotFound { command: String, scope: PathBuf },
    #[error(transparent)]
    Submodule(#[from] SubmoduleError),
    #[error(transparent)]
    Instruction(#[from] InstructionError),
}

/// A script location and how it must be invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Script path, joined onto the scope that bound it.
    pub script: PathBuf,
    /// Whether the script must be sourced rather than executed.
    pub source: bool,
    /// The scope whose `Binding` produced this result.
    pub scope: PathBuf,
}

/// Resolve `command` (a bare name) against the directives of `scope`.
///
/// # Errors
///
/// Returns `ResolveError::CommandNotFound` if neither `scope` nor anything it exports binds
/// `command`, `ResolveError::Submodule` if a directive names a missing submodule, and
/// `ResolveError::Instruction` if an instruction file on the way is malformed.
pub fn resolve(scope: &Path, command: &str) -> Result<Resolution, ResolveError> {
    let mut candidate = None;
    for directive in instructions::load(scope)? {
        match directive {
            Directive::Binding { path, name, source } => {
                if name == command {
                    trace!("{}: `{command}` bound to {}", scope.display(), path.display());
                    candidate = Some(Resolution {
                        script: scope.join(path),
                        source,
                        scope: scope.to_path_buf(),
                    });
                }
            }
            Directive::ExportAll { submodule } | Directive::LegacyExport { submodule } => {
                let sub_scope = submodule::map_submodule_path(scope, &submodule)?;
                if let Some(found) = resolve_optional(&sub_scope, command)? {
                    trace!("{}: `{command}` exported from [{submodule}]", scope.display());
                    candidate = Some(found);
                }
            }
            Directive::Rebind {
                submodule,
                from,
                to,
            } => {
                if to.iter().any(|name| name == command) {
                    let sub_scope = submodule::map_submodule_path(scope, &submodule)?;
                    if let Some(found) = resolve_optional(&sub_scope, &from)? {
                        trace!(
                            "{}: `{command}` rebound from [{submodule}] `{from}`",
                            scope.display()
                        );
                        candidate = Some(found);
                    }
                }
            }
        }
    }
    candidate.ok_or_else(|| ResolveError::CommandNotFound {
        command: command.to_string(),
        scope: scope.to_path_buf(),
    })
}

/// Like `resolve`, but an unbound name is `None` rather than an error.
fn resolve_optional(scope: &Path, command: &str) -> Result<Option<Resolution>, ResolveError> {
    match resolve(scope, command) {
        Ok(found) => Ok(Some(found)),
        Err(ResolveError::CommandNotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Resolve a full `sub1:sub2:name` address from the repository's root scope.
///
/// The submodule chain is followed directly, so the command does not need to be exported.
///
/// # Errors
///
/// Returns `ResolveError::Submodule` if any segment of the chain is missing, otherwise the
/// errors of `resolve`.
pub fn resolve_full_command(root_scope: &Path, full_command: &str) -> Result<Resolution, ResolveError> {
    let (chain, name) = submodule::split_command_name(full_command);
    let scope = submodule::map_submodule_path(root_scope, chain)?;
    let resolution = resolve(&scope, name)?;
    debug!(
        "Resolved `{full_command}` to {} (source: {})",
        resolution.script.display(),
        resolution.source
    );
    Ok(resolution)
}

/// Every command name visible in `scope`, with what it resolves to.
///
/// Uses the same directive order and shadowing as `resolve`, so each entry equals
/// `resolve(scope, name)`. Names whose resolution would fail on a rebind of a missing
/// submodule are left out.
///
/// # Errors
///
/// Returns `ResolveError::Submodule` or `ResolveError::Instruction` where `resolve` would
/// fail for every name.
pub fn visible_bindings(scope: &Path) -> Result<BTreeMap<String, Resolution>, ResolveError> {
    let (mut bindings, broken) = collect_bindings(scope)?;
    bindings.retain(|name, _| !broken.contains(name));
    Ok(bindings)
}

/// Bindings of `scope`, plus the names `resolve` would fail on.
///
/// A name that hits a failing rebind is broken for good: `resolve` stops at that line
/// whatever comes after it.
fn collect_bindings(
    scope: &Path,
) -> Result<(BTreeMap<String, Resolution>, BTreeSet<String>), ResolveError> {
    let mut bindings = BTreeMap::new();
    let mut broken = BTreeSet::new();
    for directive in instructions::load(scope)? {
        match directive {
            Directive::Binding { path, name, source } => {
                bindings.insert(
                    name,
                    Resolution {
                        script: scope.join(path),
                        source,
                        scope: scope.to_path_buf(),
                    },
                );
            }
            Directive::ExportAll { submodule } | Directive::LegacyExport { submodule } => {
                let sub_scope = submodule::map_submodule_path(scope, &submodule)?;
                let (sub_bindings, sub_broken) = collect_bindings(&sub_scope)?;
                bindings.extend(sub_bindings);
                broken.extend(sub_broken);
            }
            Directive::Rebind {
                submodule,
                from,
                to,
            } => {
                let found = submodule::map_submodule_path(scope, &submodule)
                    .map_err(ResolveError::from)
                    .and_then(|sub_scope| resolve_optional(&sub_scope, &from));
                match found {
                    Ok(Some(found)) => {
                        for name in to {
                            bindings.insert(name, found.clone());
                        }
                    }
                    Ok(None) => {}
                    Err(ResolveError::Submodule(e)) => {
                        warn!("{}: hiding {} ({e})", scope.display(), to.join(", "));
                        broken.extend(to);
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }
    Ok((bindings, broken))
}
