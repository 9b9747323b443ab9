//! Locating `@import` statements in Less sources.
//!
//! Only the import target is extracted; no other Less syntax is understood.

use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

fn import_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"@import\s*['"](.*)['"]\s*;"#).expect("valid import regex"))
}

/// Extracts the raw target of an `@import "x";` line.
pub fn parse_import_line(line: &str) -> Option<&str> {
    import_regex()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Resolves an import target against the file that contains the statement.
///
/// A target without an extension gets `.less`; a relative target is taken
/// relative to the importing file's directory.
pub fn resolve_import(importing_file: &Path, target: &str) -> PathBuf {
    let mut target = PathBuf::from(target);
    if target.extension().is_none() {
        target.set_extension("less");
    }
    let resolved = if target.is_absolute() {
        target
    } else {
        importing_file
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(target)
    };
    normalize(&resolved)
}

/// Reads `less_file` and returns its resolved imports in statement order.
/// An unreadable file yields no imports.
pub fn scan_imports(less_file: &Path) -> Vec<PathBuf> {
    let file = match File::open(less_file) {
        Ok(file) => file,
        Err(err) => {
            log::trace!("Cannot open {} for imports: {}", less_file.display(), err);
            return Vec::new();
        }
    };

    let mut imports = Vec::new();
    // Raw lines: a stray non-UTF-8 byte in a comment must not hide later imports.
    for line in BufReader::new(file).split(b'\n') {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                log::warn!("Stopped reading {}: {}", less_file.display(), err);
                break;
            }
        };
        let line = String::from_utf8_lossy(&line);
        if let Some(target) = parse_import_line(&line) {
            imports.push(resolve_import(less_file, target));
        }
    }
    imports
}

/// Lexically removes `.` and `..` so one file has one visited-set key.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
