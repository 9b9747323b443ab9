use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run before any stylesheet is compiled.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("source_path is required")]
    MissingSourcePath,

    #[error("source directory not found: {0}")]
    SourceRootNotFound(PathBuf),

    #[error("unsupported option '{0}'")]
    UnsupportedOption(String),

    #[error("invalid value for option '{key}': expected {expected}")]
    InvalidOptionValue { key: &'static str, expected: String },

    #[error("invalid less_pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("invalid source_exclude pattern: {0}")]
    InvalidExcludePattern(#[from] regex::Error),

    #[error("failed to load defaults from {path}: {message}")]
    DefaultsFile { path: PathBuf, message: String },
}

/// Errors confined to a single stylesheet; the run continues with the next one.
#[derive(Debug, Error)]
pub enum StylesheetError {
    #[error("cannot stat {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot resolve import {import} (referenced from {referenced_from}): {source}")]
    ImportResolution {
        import: PathBuf,
        referenced_from: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to compile {source_file}: {message}")]
    Compile {
        source_file: PathBuf,
        message: String,
    },
}
