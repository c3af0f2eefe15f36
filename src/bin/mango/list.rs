use std::collections::BTreeMap;
use std::path::Path;
use std::process::ExitCode;

use mango::output::Painter;
use mango::resolve::{self, Resolution};
use mango::{MangoError, Repository, submodule};

/// List the commands visible in the root scope or in the submodule `chain`.
///
/// # Errors
///
/// Returns an error if the chain does not exist or an instruction file is malformed.
pub fn run(repo: &Repository, chain: &str, painter: &Painter) -> Result<ExitCode, MangoError> {
    let scope = submodule::map_submodule_path(&repo.scope, chain)?;
    let bindings = resolve::visible_bindings(&scope)?;
    let submodules = submodule::list_submodules(&scope).map_err(|source| MangoError::Io {
        path: scope.clone(),
        source,
    })?;

    if bindings.is_empty() {
        eprintln!("{}", painter.dim("No commands bound."));
    } else {
        println!("{}", format_bindings(&bindings, &repo.root, painter));
    }
    if !submodules.is_empty() {
        let prefix = if chain.is_empty() {
            String::new()
        } else {
            format!("{chain}:")
        };
        let names: Vec<String> = submodules
            .iter()
            .map(|name| painter.info(&format!("{prefix}{name}")))
            .collect();
        println!("\n{} {}", painter.dim("submodules:"), names.join(", "));
    }
    Ok(ExitCode::SUCCESS)
}

/// One line per command: padded name, script path relative to `root`, and the mode.
pub fn format_bindings(
    bindings: &BTreeMap<String, Resolution>,
    root: &Path,
    painter: &Painter,
) -> String {
    let width = bindings.keys().map(|name| name.chars().count()).max().unwrap_or(0);
    bindings
        .iter()
        .map(|(name, resolution)| {
            let path = resolution
                .script
                .strip_prefix(root)
                .unwrap_or(resolution.script.as_path());
            let mode = if resolution.source {
                painter.accent(" (sourced)")
            } else {
                String::new()
            };
            format!(
                "{}  {}{mode}",
                painter.bold(&format!("{name:<width$}")),
                painter.dim(&path.display().to_string())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
