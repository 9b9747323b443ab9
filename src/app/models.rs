use pathdiff::diff_paths;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// When stylesheets get (re)compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdatePolicy {
    Never,
    #[default]
    #[serde(alias = "when_changed")]
    WhenChanged,
    #[serde(alias = "allways")]
    Always,
}

impl FromStr for UpdatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "never" => Ok(Self::Never),
            "when-changed" | "when_changed" => Ok(Self::WhenChanged),
            "always" | "allways" => Ok(Self::Always),
            other => Err(format!(
                "unknown update policy '{}' (expected never, when-changed or always)",
                other
            )),
        }
    }
}

impl fmt::Display for UpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Never => "never",
            Self::WhenChanged => "when-changed",
            Self::Always => "always",
        };
        f.write_str(name)
    }
}

pub type ExcludePredicate = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

/// Decides which discovered stylesheets are skipped.
#[derive(Clone, Default)]
pub enum ExcludeRule {
    #[default]
    None,
    Predicate(ExcludePredicate),
    Pattern(Regex),
    /// Skips every stylesheet. Kept for parity with `source_exclude = true`.
    AlwaysExclude,
}

impl ExcludeRule {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    pub fn excludes(&self, path: &Path) -> bool {
        match self {
            Self::None => false,
            Self::Predicate(f) => f(path),
            Self::Pattern(re) => re.is_match(&path.to_string_lossy()),
            Self::AlwaysExclude => true,
        }
    }
}

impl fmt::Debug for ExcludeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
            Self::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Self::AlwaysExclude => f.write_str("AlwaysExclude"),
        }
    }
}

/// Immutable configuration snapshot for one compilation run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    pub source_exclude: ExcludeRule,
    pub less_pattern: String,
    pub update_policy: UpdatePolicy,
    pub compress: bool,
    pub check_imports: bool,
}

impl Settings {
    /// Maps `<source>/dir/name.less` to `<destination>/dir/name.css`.
    pub fn destination_for(&self, less_file: &Path) -> PathBuf {
        let relative = less_file
            .strip_prefix(&self.source_path)
            .map(Path::to_path_buf)
            .ok()
            .or_else(|| diff_paths(less_file, &self.source_path))
            .unwrap_or_else(|| less_file.to_path_buf());
        let relative = match relative.extension() {
            Some(ext) if ext == "less" => relative.with_extension("css"),
            _ => {
                let mut name = relative.into_os_string();
                name.push(".css");
                PathBuf::from(name)
            }
        };
        self.destination_path.join(relative)
    }

    pub fn stylesheet(&self, path: PathBuf) -> Stylesheet {
        let destination = self.destination_for(&path);
        Stylesheet {
            source: path,
            destination,
        }
    }
}

/// A discovered source file plus its derived output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Outcome of a `compile_stylesheets` run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub compiled: Vec<PathBuf>,
    pub up_to_date: Vec<PathBuf>,
    pub excluded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}
