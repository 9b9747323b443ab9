use crate::app::models::RunSummary;
use std::path::Path;

pub struct SummaryFormatter;

impl SummaryFormatter {
    /// One-line tally, e.g. `2 compiled, 5 up to date, 1 excluded, 0 failed`.
    pub fn headline(summary: &RunSummary) -> String {
        format!(
            "{} compiled, {} up to date, {} excluded, {} failed",
            summary.compiled.len(),
            summary.up_to_date.len(),
            summary.excluded.len(),
            summary.failed.len()
        )
    }

    pub fn details(summary: &RunSummary, root: &Path) -> String {
        let mut output = String::new();

        for path in &summary.compiled {
            output.push_str(&format!("compiled  {}\n", relative(path, root)));
        }
        for (path, message) in &summary.failed {
            output.push_str(&format!("failed    {}: {}\n", relative(path, root), message));
        }

        output.trim_end().to_string()
    }

    pub fn format_report(summary: &RunSummary, root: &Path) -> String {
        let details = Self::details(summary, root);
        if details.is_empty() {
            Self::headline(summary)
        } else {
            format!("{}\n{}", details, Self::headline(summary))
        }
    }
}

fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}
