use std::path::PathBuf;
use std::process::ExitCode;

use mango::output::Painter;
use mango::{MangoError, Repository};

/// Resolve `command` and run it, exiting with the script's own exit code.
///
/// # Errors
///
/// Returns an error if resolution fails or the script cannot be launched.
pub fn run(
    repo: &Repository,
    command: &str,
    args: &[String],
    cwd: PathBuf,
) -> Result<ExitCode, MangoError> {
    let code = repo.run(command, args, cwd)?;
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(u8::MAX)))
}

/// Print where `command` resolves to without running it.
///
/// # Errors
///
/// Returns an error if resolution fails.
pub fn which(repo: &Repository, command: &str, painter: &Painter) -> Result<ExitCode, MangoError> {
    let resolution = repo.resolve(command)?;
    let mode = if resolution.source {
        painter.accent(" (sourced)")
    } else {
        String::new()
    };
    println!("{}{mode}", resolution.script.display());
    Ok(ExitCode::SUCCESS)
}
