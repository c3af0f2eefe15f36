//! Script invocation

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command as ProcessCommand, ExitStatus};

use log::{debug, info};
use thiserror::Error;

use crate::config_file::DEFAULT_SHELL;
use crate::resolve::Resolution;

/// Set (to an empty string) for every script run through mango.
pub const ENV_MARKER: &str = "MANGO";
pub const ENV_REPO_PATH: &str = "MANGO_REPO_PATH";
/// Directory mango was invoked from.
pub const ENV_USER_PATH: &str = "MANGO_USER_PATH";
pub const ENV_SCRIPT_PATH: &str = "MANGO_SCRIPT_PATH";
/// Final path component of the script.
pub const ENV_SCRIPT_NAME: &str = "MANGO_SCRIPT_NAME";

/// Sources the script into the shell, forwarding the shell's positional parameters.
const SOURCE_SNIPPET: &str = ". \"$MANGO_SCRIPT_PATH\"";

#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("Script not found: {0}")]
    ScriptNotFound(PathBuf),
    #[error("Unable to launch {script}: {source}")]
    Launch {
        script: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything needed to launch one resolved script.
#[derive(Debug, Clone)]
pub struct Invocation {
    resolution: Resolution,
    repo_root: PathBuf,
    user_path: PathBuf,
    shell: String,
    extra_env: HashMap<String, String>,
}

impl Invocation {
    #[must_use]
    pub fn new(resolution: Resolution, repo_root: PathBuf, user_path: PathBuf) -> Self {
        Self {
            resolution,
            repo_root,
            user_path,
            shell: DEFAULT_SHELL.to_string(),
            extra_env: HashMap::new(),
        }
    }

    /// Shell used to source `*`-bound scripts.
    #[must_use]
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Additional variables. The `MANGO*` variables take precedence over these.
    #[must_use]
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.extra_env = env;
        self
    }

    /// Base file name of the script, without the directories it was bound through.
    #[must_use]
    pub fn script_name(&self) -> OsString {
        self.resolution
            .script
            .file_name()
            .map(OsString::from)
            .unwrap_or_default()
    }

    /// The variables mango exports to the script.
    #[must_use]
    pub fn env(&self) -> Vec<(&'static str, OsString)> {
        vec![
            (ENV_MARKER, OsString::new()),
            (ENV_REPO_PATH, self.repo_root.clone().into_os_string()),
            (ENV_USER_PATH, self.user_path.clone().into_os_string()),
            (
                ENV_SCRIPT_PATH,
                self.resolution.script.clone().into_os_string(),
            ),
            (ENV_SCRIPT_NAME, self.script_name()),
        ]
    }

    /// Build the process without starting it.
    #[must_use]
    pub fn command(&self, args: &[String]) -> ProcessCommand {
        let script = &self.resolution.script;
        let mut command = if self.resolution.source {
            let mut command = ProcessCommand::new(&self.shell);
            command.arg("-c").arg(SOURCE_SNIPPET).arg(script);
            command
        } else {
            ProcessCommand::new(script)
        };
        command
            .args(args)
            .current_dir(&self.user_path)
            .envs(&self.extra_env)
            .envs(self.env());
        command
    }

    /// Launch the script and wait for it, returning its exit code.
    ///
    /// # Errors
    ///
    /// Returns `InvokeError::ScriptNotFound` if the bound script does not exist, or
    /// `InvokeError::Launch` if the process cannot be started.
    pub fn run(&self, args: &[String]) -> Result<i32, InvokeError> {
        let script = &self.resolution.script;
        if !script.is_file() {
            return Err(InvokeError::ScriptNotFound(script.clone()));
        }
        info!(
            "Running {} ({})",
            script.display(),
            if self.resolution.source {
                "sourced"
            } else {
                "executed"
            }
        );
        let status = self
            .command(args)
            .status()
            .map_err(|source| InvokeError::Launch {
                script: script.clone(),
                source,
            })?;
        let code = exit_code(status);
        debug!("{} exited with {code}", script.display());
        Ok(code)
    }
}

/// The script's exit code; death by signal maps to `128 + signal` like a shell does.
#[must_use]
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
