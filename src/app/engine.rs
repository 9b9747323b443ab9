use crate::app::compiler::{CompileJob, StylesheetCompiler};
use crate::app::error::{ConfigError, StylesheetError};
use crate::app::models::{RunSummary, Settings, UpdatePolicy};
use crate::app::scanner::Scanner;
use crate::app::staleness::needs_update;
use std::path::Path;

/// Compiles every matched, non-excluded stylesheet that the update policy
/// selects. Per-stylesheet failures are logged and collected; only
/// configuration problems abort the run.
pub fn compile_stylesheets<C>(settings: &Settings, compiler: &C) -> Result<RunSummary, ConfigError>
where
    C: StylesheetCompiler + ?Sized,
{
    let mut summary = RunSummary::default();
    if settings.update_policy == UpdatePolicy::Never {
        log::debug!("Update policy is 'never', nothing to do");
        return Ok(summary);
    }

    if !settings.source_path.is_dir() {
        return Err(ConfigError::SourceRootNotFound(settings.source_path.clone()));
    }

    let scanner = Scanner::new(&settings.source_path, &settings.less_pattern)?;
    let candidates = scanner.scan();
    if candidates.is_empty() {
        log::warn!(
            "No stylesheets matching '{}' under {}",
            settings.less_pattern,
            settings.source_path.display()
        );
    }

    for path in candidates {
        if settings.source_exclude.excludes(&path) {
            log::debug!("LESS 'excluded' stylesheet: {}", path.display());
            summary.excluded.push(path);
            continue;
        }

        match update_stylesheet(settings, compiler, &path) {
            Ok(true) => summary.compiled.push(path),
            Ok(false) => summary.up_to_date.push(path),
            Err(err) => {
                log::error!("{}", err);
                summary.failed.push((path, err.to_string()));
            }
        }
    }

    Ok(summary)
}

/// Returns whether the stylesheet was compiled.
fn update_stylesheet<C>(settings: &Settings, compiler: &C, path: &Path) -> Result<bool, StylesheetError>
where
    C: StylesheetCompiler + ?Sized,
{
    let stale = match settings.update_policy {
        UpdatePolicy::Always => true,
        UpdatePolicy::WhenChanged => needs_update(settings, path)?,
        UpdatePolicy::Never => false,
    };
    if !stale {
        log::trace!("LESS stylesheet up to date: {}", path.display());
        return Ok(false);
    }

    compile_stylesheet(settings, compiler, path)?;
    Ok(true)
}

/// Compiles one stylesheet unconditionally.
pub fn compile_stylesheet<C>(settings: &Settings, compiler: &C, path: &Path) -> Result<(), StylesheetError>
where
    C: StylesheetCompiler + ?Sized,
{
    let sheet = settings.stylesheet(path.to_path_buf());
    log::debug!("LESS compiling stylesheet: {}", sheet.source.display());

    let job = CompileJob {
        force_fresh_parse: !sheet.destination.exists(),
        source: sheet.source,
        destination: sheet.destination,
        compress: settings.compress,
    };
    compiler.compile(&job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::ExcludeRule;
    use std::cell::RefCell;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[derive(Default)]
    struct Recorder {
        jobs: RefCell<Vec<CompileJob>>,
    }

    impl StylesheetCompiler for Recorder {
        fn compile(&self, job: &CompileJob) -> Result<(), StylesheetError> {
            self.jobs.borrow_mut().push(job.clone());
            Ok(())
        }
    }

    fn settings(root: &Path, policy: UpdatePolicy) -> Settings {
        Settings {
            source_path: root.to_path_buf(),
            destination_path: root.join("css"),
            source_exclude: ExcludeRule::None,
            less_pattern: "**/[^_]*.less".to_string(),
            update_policy: policy,
            compress: true,
            check_imports: true,
        }
    }

    #[test]
    fn never_policy_skips_even_a_missing_root() {
        let recorder = Recorder::default();
        let s = settings(Path::new("/definitely/not/here"), UpdatePolicy::Never);

        let summary = compile_stylesheets(&s, &recorder).unwrap();
        assert!(summary.compiled.is_empty());
        assert!(recorder.jobs.borrow().is_empty());
    }

    #[test]
    fn missing_root_is_a_config_error() {
        let recorder = Recorder::default();
        let s = settings(Path::new("/definitely/not/here"), UpdatePolicy::Always);

        let err = compile_stylesheets(&s, &recorder).unwrap_err();
        assert!(matches!(err, ConfigError::SourceRootNotFound(_)));
    }

    #[test]
    fn job_carries_destination_and_flags() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("admin")).unwrap();
        fs::write(dir.path().join("admin/site.less"), "").unwrap();

        let recorder = Recorder::default();
        let s = settings(dir.path(), UpdatePolicy::WhenChanged);
        let summary = compile_stylesheets(&s, &recorder).unwrap();

        assert_eq!(summary.compiled, vec![dir.path().join("admin/site.less")]);
        assert_eq!(
            recorder.jobs.borrow()[0],
            CompileJob {
                source: dir.path().join("admin/site.less"),
                destination: dir.path().join("css/admin/site.css"),
                compress: true,
                force_fresh_parse: true,
            }
        );
    }

    #[test]
    fn failing_stylesheet_does_not_stop_the_run() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.less"), "@import \"_missing\";\n").unwrap();
        fs::write(dir.path().join("b.less"), "").unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/a.css"), "").unwrap();

        let recorder = Recorder::default();
        let s = settings(dir.path(), UpdatePolicy::WhenChanged);
        let summary = compile_stylesheets(&s, &recorder).unwrap();

        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, dir.path().join("a.less"));
        assert_eq!(summary.compiled, vec![dir.path().join("b.less")]);
        assert!(!summary.is_success());
    }

    #[test]
    fn compile_stylesheet_ignores_staleness() {
        let dir = tempdir().unwrap();
        let path: PathBuf = dir.path().join("main.less");
        fs::write(&path, "").unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/main.css"), "").unwrap();

        let recorder = Recorder::default();
        compile_stylesheet(&settings(dir.path(), UpdatePolicy::Never), &recorder, &path).unwrap();

        let jobs = recorder.jobs.borrow();
        assert_eq!(jobs.len(), 1);
        assert!(!jobs[0].force_fresh_parse);
    }
}
