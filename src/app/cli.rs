use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Recompile stale Less stylesheets into CSS"
)]
pub struct Cli {
    /// Directory scanned for .less files
    #[arg(long, short = 's')]
    pub source: Option<PathBuf>,

    /// Directory receiving the .css files (defaults to the source directory)
    #[arg(long, short = 'd')]
    pub destination: Option<PathBuf>,

    /// Glob selecting stylesheets, relative to the source directory
    #[arg(long)]
    pub pattern: Option<String>,

    /// Regex; matching stylesheet paths are skipped
    #[arg(long)]
    pub exclude: Option<String>,

    /// When to compile: never, when-changed or always
    #[arg(long)]
    pub update: Option<String>,

    /// Ask the compiler for minified output
    #[arg(long)]
    pub compress: bool,

    /// Only compare each stylesheet with its own output, ignoring @import
    #[arg(long)]
    pub no_check_imports: bool,

    /// TOML file with default option values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Less compiler executable
    #[arg(long, default_value = "lessc")]
    pub lessc: PathBuf,

    /// Log debug output
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
