//! Incremental Less stylesheet compilation.
//!
//! Scans a source tree for `.less` files, works out which CSS outputs are
//! stale (following `@import` chains) and hands only those to a compiler.

pub mod app;

pub use app::compiler::{CompileJob, LesscCompiler, StylesheetCompiler};
pub use app::config::{resolve, Defaults, OptionKey, OptionValue, Overrides};
pub use app::engine::{compile_stylesheet, compile_stylesheets};
pub use app::error::{ConfigError, StylesheetError};
pub use app::models::{ExcludeRule, RunSummary, Settings, Stylesheet, UpdatePolicy};
pub use app::staleness::{contains_updated_import, needs_update};
