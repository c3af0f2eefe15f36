//! Core implementation of the mango command dispatcher
//!
//! A mango repository is any directory carrying a `.mango` marker directory. The marker
//! holds an instruction file binding short command names to scripts, and may embed other
//! scopes as submodules whose commands can be exported or renamed into the parent.

use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::config_file::{Config, ConfigError};
use crate::instructions::InstructionError;
use crate::invoke::{InvokeError, Invocation};
use crate::repo::RepoError;
use crate::resolve::{Resolution, ResolveError};
use crate::scaffold::ScaffoldError;
use crate::submodule::SubmoduleError;

pub mod config_file;
pub mod instructions;
pub mod invoke;
pub mod logger;
pub mod output;
pub mod repo;
pub mod resolve;
pub mod scaffold;
pub mod submodule;

/// Exit code when no repository encloses the working directory.
pub const EXIT_REPOSITORY_NOT_FOUND: u8 = 120;
/// Exit code when a command name is not bound.
pub const EXIT_COMMAND_NOT_FOUND: u8 = 121;
/// Exit code when a submodule address does not exist.
pub const EXIT_SUBMODULE_NOT_FOUND: u8 = 122;
/// Exit code when an instruction file does not parse.
pub const EXIT_MALFORMED_INSTRUCTION: u8 = 123;
/// Exit code for every other failure of mango itself.
pub const EXIT_TOOL_ERROR: u8 = 124;

#[derive(Error, Debug)]
pub enum MangoError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Invoke(#[from] InvokeError),
    #[error(transparent)]
    Scaffold(#[from] ScaffoldError),
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<SubmoduleError> for MangoError {
    fn from(e: SubmoduleError) -> Self {
        MangoError::Resolve(ResolveError::Submodule(e))
    }
}

impl From<InstructionError> for MangoError {
    fn from(e: InstructionError) -> Self {
        MangoError::Resolve(ResolveError::Instruction(e))
    }
}

impl MangoError {
    /// Process exit code for this error. Resolution failures each get their own code so a
    /// caller can tell them apart from a script's exit code.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            MangoError::Repo(RepoError::NotFound(_)) => EXIT_REPOSITORY_NOT_FOUND,
            MangoError::Resolve(ResolveError::CommandNotFound { .. }) => EXIT_COMMAND_NOT_FOUND,
            MangoError::Resolve(ResolveError::Submodule(_)) => EXIT_SUBMODULE_NOT_FOUND,
            MangoError::Resolve(ResolveError::Instruction(InstructionError::Malformed {
                ..
            })) => EXIT_MALFORMED_INSTRUCTION,
            _ => EXIT_TOOL_ERROR,
        }
    }
}

/// A located repository with its configuration.
#[derive(Debug, Clone)]
pub struct Repository {
    pub root: PathBuf,
    /// Root instruction scope (`root/.mango`)
    pub scope: PathBuf,
    pub config: Config,
}

impl Repository {
    /// Find the repository enclosing `start` and load its config.
    ///
    /// # Errors
    ///
    /// Returns `MangoError::Repo` if no repository is found, or `MangoError::Config` if its
    /// config file is invalid.
    pub fn discover(start: &Path) -> Result<Self, MangoError> {
        Self::open(repo::find_repo(start)?)
    }

    /// Find the repository enclosing the current working directory.
    ///
    /// # Errors
    ///
    /// As `discover`, plus `MangoError::Repo` when the working directory cannot be read.
    pub fn closest() -> Result<Self, MangoError> {
        Self::open(repo::closest_repo()?)
    }

    fn open(root: PathBuf) -> Result<Self, MangoError> {
        let scope = repo::scope_dir(&root);
        let config = Config::load(&scope)?;
        debug!("Repository scope: {}", scope.display());
        Ok(Self {
            root,
            scope,
            config,
        })
    }

    /// Resolve a `[sub:]*name` address from the root scope.
    ///
    /// # Errors
    ///
    /// Returns `MangoError::Resolve` when the address does not resolve.
    pub fn resolve(&self, full_command: &str) -> Result<Resolution, MangoError> {
        Ok(resolve::resolve_full_command(&self.scope, full_command)?)
    }

    /// Build the invocation of `resolution` for a user working in `user_path`.
    #[must_use]
    pub fn invocation(&self, resolution: Resolution, user_path: PathBuf) -> Invocation {
        Invocation::new(resolution, self.root.clone(), user_path)
            .with_shell(self.config.shell())
            .with_env(self.config.env.clone())
    }

    /// Resolve and run `full_command` with `args`, returning the script's exit code.
    ///
    /// # Errors
    ///
    /// Returns `MangoError::Resolve` if the command does not resolve and
    /// `MangoError::Invoke` if the script cannot be launched.
    pub fn run(
        &self,
        full_command: &str,
        args: &[String],
        user_path: PathBuf,
    ) -> Result<i32, MangoError> {
        let resolution = self.resolve(full_command)?;
        Ok(self.invocation(resolution, user_path).run(args)?)
    }
}
