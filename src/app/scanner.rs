use crate::app::error::ConfigError;
use globset::{GlobBuilder, GlobMatcher};
use ignore::WalkBuilder;
use pathdiff::diff_paths;
use std::path::{Path, PathBuf};

/// Enumerates the stylesheets under a source root that match the include glob.
pub struct Scanner {
    root: PathBuf,
    matcher: GlobMatcher,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>, pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            root: root.into(),
            matcher: build_matcher(pattern)?,
        })
    }

    /// Returns matching files as root-joined paths, sorted.
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut entries = Vec::new();

        // Stylesheets are never skipped because of VCS or hidden-file rules.
        let walker = WalkBuilder::new(&self.root).standard_filters(false).build();

        for result in walker {
            match result {
                Ok(entry) => {
                    if let Some(path) = self.process_entry(entry.path()) {
                        entries.push(path);
                    }
                }
                Err(err) => log::warn!("Error walking entry: {}", err),
            }
        }

        entries.sort();
        entries
    }

    fn process_entry(&self, path: &Path) -> Option<PathBuf> {
        if path == self.root || !path.is_file() {
            return None;
        }

        let relative = diff_paths(path, &self.root)?;
        if !self.matcher.is_match(&relative) {
            return None;
        }

        Some(path.to_path_buf())
    }
}

fn build_matcher(pattern: &str) -> Result<GlobMatcher, ConfigError> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
    Ok(glob.compile_matcher())
}
