//! Instruction file parsing
//!
//! Every scope may carry a `.instructions` file. Each non-empty line that does not
//! start with `#` is one directive:
//!
//! ```text
//! path/to/script.sh: name      bind `name` to a script
//! *env.sh: name                bind `name` to a script that must be sourced
//! [sub] *                      export every binding of submodule `sub`
//! [sub] old: new1 new2         expose `old` from `sub` as `new1` and `new2`
//! @export sub                  older spelling of `[sub] *`
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use thiserror::Error;

/// Name of the instruction file inside a scope.
pub const INSTRUCTIONS_FILE: &str = ".instructions";

static GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\]]*)\]\s*(.*)$").expect("valid group regex"));
static REBIND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^\s:]+)\s*:\s*(.*)$").expect("valid rebind regex"));
static BINDING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\*?)\s*([^:]*?)\s*:\s*([^\s:]*)\s*$").expect("valid binding regex")
});

/// One parsed line of an instruction file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `path: name` or `*path: name`
    Binding {
        path: PathBuf,
        name: String,
        source: bool,
    },
    /// `[sub] *`
    ExportAll { submodule: String },
    /// `[sub] old: new1 new2`
    Rebind {
        submodule: String,
        from: String,
        to: Vec<String>,
    },
    /// `@export sub`
    LegacyExport { submodule: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("unterminated `[` group")]
    UnterminatedGroup,
    #[error("empty submodule name")]
    EmptySubmodule,
    #[error("expected `*` or `old: new...` after the submodule name")]
    InvalidGroup,
    #[error("rebind of `{0}` has no target names")]
    MissingTargets(String),
    #[error("`@export` expects exactly one submodule name")]
    InvalidExport,
    #[error("unknown keyword `{0}`")]
    UnknownKeyword(String),
    #[error("expected `path: name`")]
    InvalidBinding,
    #[error("invalid UTF-8")]
    InvalidUtf8,
}

/// A syntax error, located by its 1-based line number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind} (`{text}`)")]
pub struct ParseError {
    pub line: usize,
    pub text: String,
    pub kind: SyntaxError,
}

#[derive(Error, Debug)]
pub enum InstructionError {
    #[error("Malformed instruction file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error("Unable to read instruction file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Parse the text of one instruction file into its directives, in file order.
///
/// # Errors
///
/// Returns the first `ParseError` encountered; lines after it are never looked at.
pub fn parse(text: &str) -> Result<Vec<Directive>, ParseError> {
    let mut directives = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let directive = parse_line(line).map_err(|kind| ParseError {
            line: idx + 1,
            text: line.to_string(),
            kind,
        })?;
        directives.push(directive);
    }
    Ok(directives)
}

fn parse_line(line: &str) -> Result<Directive, SyntaxError> {
    if line.starts_with('[') {
        return parse_group(line);
    }
    if let Some(keyword_line) = line.strip_prefix('@') {
        return parse_keyword(keyword_line);
    }
    parse_binding(line)
}

fn parse_group(line: &str) -> Result<Directive, SyntaxError> {
    let caps = GROUP_RE
        .captures(line)
        .ok_or(SyntaxError::UnterminatedGroup)?;
    let submodule = caps[1].trim().to_string();
    if submodule.is_empty() {
        return Err(SyntaxError::EmptySubmodule);
    }
    let rest = caps[2].trim();
    if rest == "*" {
        return Ok(Directive::ExportAll { submodule });
    }
    let caps = REBIND_RE.captures(rest).ok_or(SyntaxError::InvalidGroup)?;
    let from = caps[1].to_string();
    let to: Vec<String> = caps[2].split_whitespace().map(str::to_string).collect();
    if to.is_empty() {
        return Err(SyntaxError::MissingTargets(from));
    }
    if to.iter().any(|name| name.contains(':')) {
        return Err(SyntaxError::InvalidGroup);
    }
    Ok(Directive::Rebind {
        submodule,
        from,
        to,
    })
}

fn parse_keyword(line: &str) -> Result<Directive, SyntaxError> {
    let mut words = line.split_whitespace();
    let keyword = words.next().unwrap_or_default();
    if keyword != "export" {
        return Err(SyntaxError::UnknownKeyword(keyword.to_string()));
    }
    match (words.next(), words.next()) {
        (Some(submodule), None) => Ok(Directive::LegacyExport {
            submodule: submodule.to_string(),
        }),
        _ => Err(SyntaxError::InvalidExport),
    }
}

fn parse_binding(line: &str) -> Result<Directive, SyntaxError> {
    let caps = BINDING_RE
        .captures(line)
        .ok_or(SyntaxError::InvalidBinding)?;
    let path = &caps[2];
    let name = &caps[3];
    if path.is_empty() || name.is_empty() {
        return Err(SyntaxError::InvalidBinding);
    }
    Ok(Directive::Binding {
        path: PathBuf::from(path),
        name: name.to_string(),
        source: !caps[1].is_empty(),
    })
}

/// Read and parse the instruction file of `scope`. A scope without one has no directives.
///
/// # Errors
///
/// Returns `InstructionError::Malformed` naming the file when it is not UTF-8 or does not
/// parse, or `InstructionError::Io` when it exists but cannot be read.
pub fn load(scope: &Path) -> Result<Vec<Directive>, InstructionError> {
    let path = scope.join(INSTRUCTIONS_FILE);
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No instruction file in {}", scope.display());
            return Ok(Vec::new());
        }
        Err(source) => return Err(InstructionError::Io { path, source }),
    };
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            let source = utf8_error(e.as_bytes(), e.utf8_error().valid_up_to());
            return Err(InstructionError::Malformed { path, source });
        }
    };
    parse(&text).map_err(|source| InstructionError::Malformed { path, source })
}

/// Locate the line holding the first invalid byte at `valid_up_to`.
fn utf8_error(bytes: &[u8], valid_up_to: usize) -> ParseError {
    let (before, after) = bytes.split_at(valid_up_to);
    let line_start = before.iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1);
    let line_end = after
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |i| valid_up_to + i);
    ParseError {
        line: before.iter().filter(|&&b| b == b'\n').count() + 1,
        text: String::from_utf8_lossy(&bytes[line_start..line_end])
            .trim()
            .to_string(),
        kind: SyntaxError::InvalidUtf8,
    }
}
