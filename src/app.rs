// Declare modules
pub mod cli;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod imports;
pub mod models;
pub mod scanner;
pub mod staleness;

use anyhow::{Context, Result};
use clap::Parser;
use std::env;

use self::cli::Cli;
use self::compiler::LesscCompiler;
use self::config::{load_defaults, resolve, OptionKey, Overrides};
use self::engine::compile_stylesheets;
use self::formatter::SummaryFormatter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn overrides_from(args: &Cli) -> Overrides {
    let mut overrides = Overrides::new();
    if let Some(source) = &args.source {
        overrides.push(OptionKey::SourcePath.as_str(), source.clone());
    }
    if let Some(destination) = &args.destination {
        overrides.push(OptionKey::DestinationPath.as_str(), destination.clone());
    }
    if let Some(pattern) = &args.pattern {
        overrides.push(OptionKey::LessPattern.as_str(), pattern.as_str());
    }
    if let Some(exclude) = &args.exclude {
        overrides.push(OptionKey::SourceExclude.as_str(), exclude.as_str());
    }
    if let Some(update) = &args.update {
        overrides.push(OptionKey::UpdatePolicy.as_str(), update.as_str());
    }
    if args.compress {
        overrides.push(OptionKey::Compress.as_str(), true);
    }
    if args.no_check_imports {
        overrides.push(OptionKey::CheckImports.as_str(), false);
    }
    overrides
}

/// Parses arguments, resolves settings and runs one compilation pass.
/// Returns false when any stylesheet failed.
pub fn run() -> Result<bool> {
    // 1. Parse Args
    let args = Cli::parse();
    init_logging(args.verbose);

    // 2. Load Defaults
    let current_dir = env::current_dir().context("Failed to get current directory")?;
    let defaults = load_defaults(args.config.as_deref(), &current_dir)
        .context("Failed to load default options")?;

    // 3. Resolve Configuration
    let settings = resolve(&defaults, overrides_from(&args)).context("Invalid options")?;
    log::debug!(
        "Compiling {} -> {} ({})",
        settings.source_path.display(),
        settings.destination_path.display(),
        settings.update_policy
    );

    // 4. Compile
    let compiler = LesscCompiler::new(&args.lessc);
    let summary = compile_stylesheets(&settings, &compiler).with_context(|| {
        format!("Cannot compile stylesheets in {}", settings.source_path.display())
    })?;

    // 5. Report
    println!(
        "{}",
        SummaryFormatter::format_report(&summary, &settings.source_path)
    );

    Ok(summary.is_success())
}
