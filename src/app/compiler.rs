use crate::app::error::StylesheetError;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// One request to the external Less compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileJob {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub compress: bool,
    /// Set when no output exists yet; compilers with a parse cache should
    /// parse from scratch.
    pub force_fresh_parse: bool,
}

/// The Less-to-CSS transformation. Implementations own all CSS semantics.
pub trait StylesheetCompiler {
    fn compile(&self, job: &CompileJob) -> Result<(), StylesheetError>;
}

impl<C: StylesheetCompiler + ?Sized> StylesheetCompiler for &C {
    fn compile(&self, job: &CompileJob) -> Result<(), StylesheetError> {
        (**self).compile(job)
    }
}

/// Runs the `lessc` command line compiler.
#[derive(Debug, Clone)]
pub struct LesscCompiler {
    program: PathBuf,
}

impl Default for LesscCompiler {
    fn default() -> Self {
        Self::new("lessc")
    }
}

impl LesscCompiler {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, job: &CompileJob) -> Command {
        let mut cmd = Command::new(&self.program);
        if job.compress {
            cmd.arg("--compress");
        }
        cmd.arg(&job.source).arg(&job.destination);
        cmd
    }
}

impl StylesheetCompiler for LesscCompiler {
    fn compile(&self, job: &CompileJob) -> Result<(), StylesheetError> {
        let fail = |message: String| StylesheetError::Compile {
            source_file: job.source.clone(),
            message,
        };

        if let Some(parent) = job.destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| fail(format!("cannot create {}: {}", parent.display(), e)))?;
        }

        // lessc keeps no parse cache, so a fresh parse is what it always does.
        log::trace!(
            "lessc {} (fresh parse: {})",
            job.source.display(),
            job.force_fresh_parse
        );

        let output = self
            .command(job)
            .output()
            .map_err(|e| fail(format!("cannot run {}: {}", self.program.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(format!("{} ({})", stderr.trim(), output.status)));
        }
        Ok(())
    }
}
