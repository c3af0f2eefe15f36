use std::io::{IsTerminal, Write};
use std::path::Path;
use std::process::ExitCode;

use mango::output::{ColorChoice, Painter};
use mango::{MangoError, repo, scaffold};

/// Create a repository in `cwd`.
///
/// # Errors
///
/// Returns an error if the repository exists (without `force`) or cannot be written.
pub fn run_init(cwd: &Path, force: bool, color: Option<ColorChoice>) -> Result<ExitCode, MangoError> {
    let painter = Painter::new(color.unwrap_or_default());
    let scope = scaffold::init_repo(cwd, force)?;
    eprintln!(
        "{} initialized mango repository in {}",
        painter.success("✓"),
        scope.display()
    );
    Ok(ExitCode::SUCCESS)
}

/// Delete the repository enclosing `cwd`, asking first on an interactive terminal.
///
/// # Errors
///
/// Returns an error if no repository encloses `cwd` or some entries could not be removed.
pub fn run_remove(cwd: &Path, force: bool, color: Option<ColorChoice>) -> Result<ExitCode, MangoError> {
    let painter = Painter::new(color.unwrap_or_default());
    let root = repo::find_repo(cwd)?;
    let scope = repo::scope_dir(&root);

    if !force {
        if !(std::io::stdin().is_terminal() && std::io::stderr().is_terminal()) {
            eprintln!(
                "{} refusing to remove {} without --force",
                painter.warn("!"),
                scope.display()
            );
            return Ok(ExitCode::FAILURE);
        }
        eprint!("Remove {} and everything in it? [y/N] ", scope.display());
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        std::io::stdin()
            .read_line(&mut answer)
            .map_err(|source| MangoError::Io {
                path: scope.clone(),
                source,
            })?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            return Ok(ExitCode::FAILURE);
        }
    }

    if let Err(e) = scaffold::remove_repo(&root) {
        if let scaffold::ScaffoldError::Partial { ref failures, .. } = e {
            for (path, err) in failures {
                eprintln!("  {} {}: {err}", painter.error("✘"), path.display());
            }
        }
        return Err(e.into());
    }
    eprintln!("{} removed {}", painter.success("✓"), scope.display());
    Ok(ExitCode::SUCCESS)
}
