use crate::app::error::ConfigError;
use crate::app::models::{ExcludeRule, Settings, UpdatePolicy};
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_LESS_PATTERN: &str = "**/[^_]*.less";
pub const DEFAULTS_FILE_NAME: &str = "lessup.toml";

/// The fixed set of recognised option names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    SourcePath,
    DestinationPath,
    SourceExclude,
    LessPattern,
    UpdatePolicy,
    Compress,
    CheckImports,
}

impl OptionKey {
    pub const ALL: [OptionKey; 7] = [
        Self::SourcePath,
        Self::DestinationPath,
        Self::SourceExclude,
        Self::LessPattern,
        Self::UpdatePolicy,
        Self::Compress,
        Self::CheckImports,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SourcePath => "source_path",
            Self::DestinationPath => "destination_path",
            Self::SourceExclude => "source_exclude",
            Self::LessPattern => "less_pattern",
            Self::UpdatePolicy => "update_policy",
            Self::Compress => "compress",
            Self::CheckImports => "check_imports",
        }
    }
}

impl FromStr for OptionKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "update_templates" {
            return Ok(Self::UpdatePolicy);
        }
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ConfigError::UnsupportedOption(s.to_string()))
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loosely typed option value, checked against its key when applied.
#[derive(Debug, Clone)]
pub enum OptionValue {
    Path(PathBuf),
    Text(String),
    Bool(bool),
    Policy(UpdatePolicy),
    Exclude(ExcludeRule),
}

impl From<PathBuf> for OptionValue {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<&Path> for OptionValue {
    fn from(value: &Path) -> Self {
        Self::Path(value.to_path_buf())
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<UpdatePolicy> for OptionValue {
    fn from(value: UpdatePolicy) -> Self {
        Self::Policy(value)
    }
}

impl From<ExcludeRule> for OptionValue {
    fn from(value: ExcludeRule) -> Self {
        Self::Exclude(value)
    }
}

/// On-disk defaults, e.g. `lessup.toml`.
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct DefaultsFile {
    source_path: Option<PathBuf>,
    destination_path: Option<PathBuf>,
    source_exclude: Option<ExcludeSetting>,
    less_pattern: Option<String>,
    #[serde(alias = "update_templates")]
    update_policy: Option<UpdatePolicy>,
    compress: Option<bool>,
    check_imports: Option<bool>,
}

/// `source_exclude` in a file: a regex, or `true` to skip everything.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ExcludeSetting {
    Pattern(String),
    Flag(bool),
}

/// Process-wide defaults owned by the host. Every run snapshots them.
#[derive(Debug, Clone)]
pub struct Defaults {
    source_path: Option<PathBuf>,
    destination_path: Option<PathBuf>,
    source_exclude: ExcludeRule,
    less_pattern: String,
    update_policy: UpdatePolicy,
    compress: bool,
    check_imports: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            source_path: None,
            destination_path: None,
            source_exclude: ExcludeRule::None,
            less_pattern: DEFAULT_LESS_PATTERN.to_string(),
            update_policy: UpdatePolicy::WhenChanged,
            compress: false,
            check_imports: true,
        }
    }
}

impl Defaults {
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn set_source_path(&mut self, path: impl Into<PathBuf>) {
        self.source_path = Some(path.into());
    }

    /// Falls back to the source path when no destination was set.
    pub fn destination_path(&self) -> Option<&Path> {
        self.destination_path
            .as_deref()
            .or(self.source_path.as_deref())
    }

    pub fn set_destination_path(&mut self, path: Option<PathBuf>) {
        self.destination_path = path;
    }

    pub fn source_exclude(&self) -> &ExcludeRule {
        &self.source_exclude
    }

    pub fn set_source_exclude(&mut self, rule: ExcludeRule) {
        self.source_exclude = rule;
    }

    pub fn less_pattern(&self) -> &str {
        &self.less_pattern
    }

    pub fn set_less_pattern(&mut self, pattern: impl Into<String>) {
        self.less_pattern = pattern.into();
    }

    pub fn update_policy(&self) -> UpdatePolicy {
        self.update_policy
    }

    pub fn set_update_policy(&mut self, policy: UpdatePolicy) {
        self.update_policy = policy;
    }

    pub fn compress(&self) -> bool {
        self.compress
    }

    pub fn set_compress(&mut self, compress: bool) {
        self.compress = compress;
    }

    pub fn check_imports(&self) -> bool {
        self.check_imports
    }

    pub fn set_check_imports(&mut self, check: bool) {
        self.check_imports = check;
    }

    /// Applies a single option, checking the value's shape against the key.
    pub fn set(&mut self, key: OptionKey, value: OptionValue) -> Result<(), ConfigError> {
        let invalid = |expected: &str| ConfigError::InvalidOptionValue {
            key: key.as_str(),
            expected: expected.to_string(),
        };

        match (key, value) {
            (OptionKey::SourcePath, OptionValue::Path(p)) => self.source_path = Some(p),
            (OptionKey::SourcePath, OptionValue::Text(s)) => self.source_path = Some(s.into()),
            (OptionKey::SourcePath, _) => return Err(invalid("a path")),

            (OptionKey::DestinationPath, OptionValue::Path(p)) => {
                self.destination_path = Some(p)
            }
            (OptionKey::DestinationPath, OptionValue::Text(s)) => {
                self.destination_path = Some(s.into())
            }
            (OptionKey::DestinationPath, _) => return Err(invalid("a path")),

            (OptionKey::SourceExclude, OptionValue::Exclude(rule)) => self.source_exclude = rule,
            (OptionKey::SourceExclude, OptionValue::Text(s)) => {
                self.source_exclude = ExcludeRule::Pattern(Regex::new(&s)?)
            }
            (OptionKey::SourceExclude, OptionValue::Bool(true)) => {
                self.source_exclude = ExcludeRule::AlwaysExclude
            }
            (OptionKey::SourceExclude, OptionValue::Bool(false)) => {
                self.source_exclude = ExcludeRule::None
            }
            (OptionKey::SourceExclude, _) => {
                return Err(invalid("a regex, a predicate or a boolean"))
            }

            (OptionKey::LessPattern, OptionValue::Text(s)) => self.less_pattern = s,
            (OptionKey::LessPattern, _) => return Err(invalid("a glob pattern")),

            (OptionKey::UpdatePolicy, OptionValue::Policy(p)) => self.update_policy = p,
            (OptionKey::UpdatePolicy, OptionValue::Text(s)) => {
                self.update_policy = s.parse().map_err(|e: String| invalid(&e))?
            }
            (OptionKey::UpdatePolicy, _) => return Err(invalid("never, when-changed or always")),

            (OptionKey::Compress, OptionValue::Bool(b)) => self.compress = b,
            (OptionKey::Compress, _) => return Err(invalid("a boolean")),

            (OptionKey::CheckImports, OptionValue::Bool(b)) => self.check_imports = b,
            (OptionKey::CheckImports, _) => return Err(invalid("a boolean")),
        }
        Ok(())
    }

    /// Reads a TOML table of option keys into these defaults.
    pub fn load_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let file_error = |message: String| ConfigError::DefaultsFile {
            path: path.to_path_buf(),
            message,
        };

        let content = fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
        let table: toml::Table = toml::from_str(&content).map_err(|e| file_error(e.to_string()))?;
        for name in table.keys() {
            name.parse::<OptionKey>()?;
        }

        let file: DefaultsFile = toml::Value::Table(table)
            .try_into()
            .map_err(|e| file_error(e.to_string()))?;
        self.apply_file(file)
    }

    fn apply_file(&mut self, file: DefaultsFile) -> Result<(), ConfigError> {
        if let Some(path) = file.source_path {
            self.source_path = Some(path);
        }
        if let Some(path) = file.destination_path {
            self.destination_path = Some(path);
        }
        if let Some(exclude) = file.source_exclude {
            self.source_exclude = match exclude {
                ExcludeSetting::Pattern(pattern) => ExcludeRule::Pattern(Regex::new(&pattern)?),
                ExcludeSetting::Flag(true) => ExcludeRule::AlwaysExclude,
                ExcludeSetting::Flag(false) => ExcludeRule::None,
            };
        }
        if let Some(pattern) = file.less_pattern {
            self.less_pattern = pattern;
        }
        if let Some(policy) = file.update_policy {
            self.update_policy = policy;
        }
        if let Some(compress) = file.compress {
            self.compress = compress;
        }
        if let Some(check) = file.check_imports {
            self.check_imports = check;
        }
        Ok(())
    }

    /// Freezes the current defaults into a run snapshot.
    pub fn snapshot(&self) -> Result<Settings, ConfigError> {
        let source_path = self
            .source_path
            .clone()
            .ok_or(ConfigError::MissingSourcePath)?;
        let destination_path = self
            .destination_path
            .clone()
            .unwrap_or_else(|| source_path.clone());

        Ok(Settings {
            source_path,
            destination_path,
            source_exclude: self.source_exclude.clone(),
            less_pattern: self.less_pattern.clone(),
            update_policy: self.update_policy,
            compress: self.compress,
            check_imports: self.check_imports,
        })
    }
}

/// Per-invocation options keyed by name; unknown names are rejected on resolve.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    entries: Vec<(String, OptionValue)>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.entries.push((key.into(), value.into()));
    }
}

/// Merges overrides onto the defaults: override > default > built-in.
pub fn resolve(defaults: &Defaults, overrides: Overrides) -> Result<Settings, ConfigError> {
    let mut merged = defaults.clone();
    for (name, value) in overrides.entries {
        let key: OptionKey = name.parse()?;
        merged.set(key, value)?;
    }
    merged.snapshot()
}

fn user_defaults_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lessup").join("config.toml"))
}

/// Explicit file > `./lessup.toml` > user config dir > built-ins.
pub fn load_defaults(explicit: Option<&Path>, cwd: &Path) -> Result<Defaults, ConfigError> {
    let mut defaults = Defaults::default();

    if let Some(path) = explicit {
        defaults.load_file(path)?;
        return Ok(defaults);
    }

    let candidates = [Some(cwd.join(DEFAULTS_FILE_NAME)), user_defaults_path()];
    if let Some(path) = candidates.into_iter().flatten().find(|p| p.is_file()) {
        log::debug!("Loading defaults from {}", path.display());
        defaults.load_file(&path)?;
    }

    Ok(defaults)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn builtin_defaults() {
        let d = Defaults::default();
        assert_eq!(d.less_pattern(), "**/[^_]*.less");
        assert_eq!(d.update_policy(), UpdatePolicy::WhenChanged);
        assert!(d.check_imports());
        assert!(!d.compress());
        assert!(d.source_path().is_none());
    }

    #[test]
    fn destination_path_defaults_to_source_path_unless_set() {
        let mut d = Defaults::default();
        d.set_source_path("/styles");
        assert_eq!(d.destination_path(), Some(Path::new("/styles")));

        d.set_destination_path(Some(PathBuf::from("/public")));
        assert_eq!(d.destination_path(), Some(Path::new("/public")));
    }

    #[test]
    fn resolve_prefers_overrides() {
        let mut d = Defaults::default();
        d.set_source_path("/styles");
        d.set_compress(false);

        let settings = resolve(
            &d,
            Overrides::new()
                .with("compress", true)
                .with("update_policy", "always"),
        )
        .unwrap();

        assert!(settings.compress);
        assert_eq!(settings.update_policy, UpdatePolicy::Always);
        assert_eq!(settings.destination_path, PathBuf::from("/styles"));
        assert!(settings.check_imports);
    }

    #[test]
    fn resolve_reads_defaults_at_call_time() {
        let mut d = Defaults::default();
        d.set_source_path("/a");
        let first = resolve(&d, Overrides::new()).unwrap();
        d.set_source_path("/b");
        let second = resolve(&d, Overrides::new()).unwrap();

        assert_eq!(first.source_path, PathBuf::from("/a"));
        assert_eq!(second.source_path, PathBuf::from("/b"));
    }

    #[test]
    fn resolve_rejects_unknown_keys() {
        let mut d = Defaults::default();
        d.set_source_path("/styles");
        let err = resolve(&d, Overrides::new().with("minify", true)).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedOption(ref k) if k == "minify"));
    }

    #[test]
    fn resolve_requires_source_path() {
        let err = resolve(&Defaults::default(), Overrides::new()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSourcePath));
    }

    #[test]
    fn resolve_rejects_mistyped_values() {
        let mut d = Defaults::default();
        d.set_source_path("/styles");
        let err = resolve(&d, Overrides::new().with("compress", "yes")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidOptionValue { key: "compress", .. }
        ));
    }

    #[test]
    fn source_exclude_text_becomes_pattern() {
        let mut d = Defaults::default();
        d.set_source_path("/styles");
        let settings = resolve(&d, Overrides::new().with("source_exclude", "another")).unwrap();
        assert!(settings
            .source_exclude
            .excludes(Path::new("/styles/another.less")));
        assert!(!settings.source_exclude.excludes(Path::new("/styles/some.less")));
    }

    #[test]
    fn load_file_applies_known_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULTS_FILE_NAME);
        fs::write(
            &path,
            r#"
source_path = "assets/less"
destination_path = "public/css"
update_templates = "allways"
compress = true
"#,
        )
        .unwrap();

        let mut d = Defaults::default();
        d.load_file(&path).unwrap();

        assert_eq!(d.source_path(), Some(Path::new("assets/less")));
        assert_eq!(d.destination_path(), Some(Path::new("public/css")));
        assert_eq!(d.update_policy(), UpdatePolicy::Always);
        assert!(d.compress());
    }

    #[test]
    fn load_file_reads_exclude_and_policy_spellings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULTS_FILE_NAME);
        fs::write(
            &path,
            "source_exclude = \"vendor/\"\nupdate_policy = \"when_changed\"\ncheck_imports = false\n",
        )
        .unwrap();

        let mut d = Defaults::default();
        d.set_update_policy(UpdatePolicy::Never);
        d.load_file(&path).unwrap();

        assert_eq!(d.update_policy(), UpdatePolicy::WhenChanged);
        assert!(!d.check_imports());
        assert!(d.source_exclude().excludes(Path::new("/s/vendor/x.less")));
        assert!(!d.source_exclude().excludes(Path::new("/s/site.less")));

        fs::write(&path, "source_exclude = true\n").unwrap();
        d.load_file(&path).unwrap();
        assert!(matches!(d.source_exclude(), ExcludeRule::AlwaysExclude));
    }

    #[test]
    fn load_file_rejects_mistyped_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULTS_FILE_NAME);
        fs::write(&path, "update_policy = \"sometimes\"\n").unwrap();
        let err = Defaults::default().load_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::DefaultsFile { .. }));

        fs::write(&path, "compress = \"yes\"\n").unwrap();
        let err = Defaults::default().load_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::DefaultsFile { .. }));
    }

    #[test]
    fn load_file_rejects_unknown_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULTS_FILE_NAME);
        fs::write(&path, "logger = \"stdout\"\n").unwrap();

        let err = Defaults::default().load_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedOption(_)));
    }

    #[test]
    fn load_defaults_prefers_explicit_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(DEFAULTS_FILE_NAME), "compress = true\n").unwrap();
        let explicit = dir.path().join("other.toml");
        fs::write(&explicit, "check_imports = false\n").unwrap();

        let d = load_defaults(Some(&explicit), dir.path()).unwrap();
        assert!(!d.check_imports());
        assert!(!d.compress());
    }

    #[test]
    fn load_defaults_finds_project_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(DEFAULTS_FILE_NAME), "compress = true\n").unwrap();

        let d = load_defaults(None, dir.path()).unwrap();
        assert!(d.compress());
    }
}
