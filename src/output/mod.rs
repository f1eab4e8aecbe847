//! Human-readable output for candidates and run results
//!
//! This module provides:
//! - Candidate listing grouped by workspace, numbered for selection
//! - Run summary with committed, rolled back and skipped updates

use crate::domain::{ItemOutcome, RunSummary, Update, Workspace};
use crate::error::ItemError;
use colored::Colorize;
use std::io::{self, Write};
use std::path::Path;

/// Text report writer
#[derive(Debug, Clone, Copy)]
pub struct Report {
    /// Whether to use colors
    color: bool,
}

impl Report {
    /// Create a new report writer
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Width of the widest package name, for alignment
    fn name_width<'a>(updates: impl Iterator<Item = &'a Update>) -> usize {
        updates.map(|u| u.package_name.len()).max().unwrap_or(0)
    }

    fn update_line(&self, update: &Update, width: usize) -> String {
        if self.color {
            format!(
                "{} {} {} {} ({})",
                format!("{:width$}", update.package_name, width = width).bold(),
                update.current_version.dimmed(),
                "=>".dimmed(),
                update.latest_version.bright_white(),
                update.version_diff.colored_label()
            )
        } else {
            format!(
                "{:width$} {} => {} ({})",
                update.package_name,
                update.current_version,
                update.latest_version,
                update.version_diff,
                width = width
            )
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().underline().to_string()
        } else {
            text.to_string()
        }
    }

    /// Write candidates grouped by workspace with 1-based selection numbers
    pub fn write_candidates(&self, candidates: &[Update], writer: &mut dyn Write) -> io::Result<()> {
        let mut groups: Vec<(&Workspace, Vec<(usize, &Update)>)> = Vec::new();
        for (index, update) in candidates.iter().enumerate() {
            match groups.iter_mut().find(|(ws, _)| **ws == update.workspace) {
                Some((_, members)) => members.push((index, update)),
                None => groups.push((&update.workspace, vec![(index, update)])),
            }
        }

        let width = Self::name_width(candidates.iter());
        let number_width = candidates.len().to_string().len();

        for (workspace, members) in groups {
            writeln!(writer, "{}", self.heading(&workspace.to_string()))?;
            for (index, update) in members {
                writeln!(
                    writer,
                    "  {:>nw$}) {}",
                    index + 1,
                    self.update_line(update, width),
                    nw = number_width
                )?;
            }
        }
        Ok(())
    }

    /// Write why an update failed, followed by the output of the failing process
    pub fn write_failure(
        &self,
        update: &Update,
        error: &ItemError,
        writer: &mut dyn Write,
    ) -> io::Result<()> {
        let heading = format!("{} failed: {}", update.package_name, error);
        if self.color {
            writeln!(writer, "{}", heading.red().bold())?;
        } else {
            writeln!(writer, "{}", heading)?;
        }

        if let Some(output) = error.output() {
            for text in [&output.stdout, &output.stderr] {
                let text = text.trim_end();
                if !text.is_empty() {
                    writeln!(writer, "{}", text)?;
                }
            }
        }
        Ok(())
    }

    /// Write the outcome of a run; `log_path` is shown when failures were logged
    pub fn write_summary(
        &self,
        summary: &RunSummary,
        log_path: Option<&Path>,
        writer: &mut dyn Write,
    ) -> io::Result<()> {
        if summary.outcomes.is_empty() && summary.not_attempted.is_empty() {
            writeln!(writer, "No updates applied.")?;
            return Ok(());
        }

        let width = Self::name_width(
            summary
                .outcomes
                .iter()
                .map(ItemOutcome::update)
                .chain(summary.not_attempted.iter()),
        );

        writeln!(writer)?;
        writeln!(writer, "{}", self.heading("Summary"))?;

        for outcome in &summary.outcomes {
            let line = self.update_line(outcome.update(), width);
            let workspace = &outcome.update().workspace;
            let location = if workspace.is_unnamed() {
                String::new()
            } else {
                format!(" in {}", workspace)
            };

            match outcome {
                ItemOutcome::Committed { .. } => {
                    if self.color {
                        writeln!(writer, "  {} {}{}", "✓".green(), line, location.dimmed())?;
                    } else {
                        writeln!(writer, "  ✓ {}{}", line, location)?;
                    }
                }
                ItemOutcome::RolledBack { stage, message, .. } => {
                    let reason = format!("rolled back after {}: {}", stage, message);
                    if self.color {
                        writeln!(
                            writer,
                            "  {} {}{} {}",
                            "✗".red(),
                            line,
                            location.dimmed(),
                            reason.red()
                        )?;
                    } else {
                        writeln!(writer, "  ✗ {}{} {}", line, location, reason)?;
                    }
                }
            }
        }

        for update in &summary.not_attempted {
            let line = format!("  - {} (not attempted)", self.update_line(update, width));
            if self.color {
                writeln!(writer, "{}", line.dimmed())?;
            } else {
                writeln!(writer, "{}", line)?;
            }
        }

        writeln!(writer)?;
        let committed = summary.committed_count();
        let rolled_back = summary.rolled_back_count();
        let elapsed = summary
            .elapsed()
            .map(|d| format!(" in {:.1}s", d.num_milliseconds() as f64 / 1000.0))
            .unwrap_or_default();

        if self.color {
            writeln!(
                writer,
                "{} committed, {} rolled back{}",
                committed.to_string().green(),
                rolled_back.to_string().red(),
                elapsed
            )?;
        } else {
            writeln!(writer, "{} committed, {} rolled back{}", committed, rolled_back, elapsed)?;
        }

        if let Some(path) = log_path {
            writeln!(writer, "Failures were logged to {}", path.display())?;
        }
        Ok(())
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Candidate listing as shown by the interactive prompt
pub fn render_candidates(candidates: &[Update]) -> String {
    let mut buffer = Vec::new();
    // Writing into a Vec cannot fail
    let _ = Report::default().write_candidates(candidates, &mut buffer);
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOutput;
    use crate::domain::{FailureStage, VersionDiff};

    fn plain() -> Report {
        Report::new(false)
    }

    fn candidates() -> Vec<Update> {
        vec![
            Update::new("vitest", Workspace::root("root"), VersionDiff::Major, "3.2.4", "4.0.16"),
            Update::new("zod", Workspace::new("web"), VersionDiff::Minor, "4.1.13", "4.3.2"),
            Update::new("sass", Workspace::new("web"), VersionDiff::Patch, "1.96.0", "1.96.1"),
        ]
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_candidates_grouped_and_numbered() {
        let text = render(|w| plain().write_candidates(&candidates(), w));

        assert_eq!(
            text,
            "root\n  1) vitest 3.2.4 => 4.0.16 (major)\nweb\n  2) zod    4.1.13 => 4.3.2 (minor)\n  3) sass   1.96.0 => 1.96.1 (patch)\n"
        );
    }

    #[test]
    fn test_candidates_unnamed_workspace() {
        let updates = vec![Update::new("zod", Workspace::root(""), VersionDiff::Minor, "4.1.13", "4.3.2")];
        let text = render(|w| plain().write_candidates(&updates, w));
        assert!(text.starts_with("(root)\n"));
    }

    #[test]
    fn test_summary_empty() {
        let summary = RunSummary::new();
        let text = render(|w| plain().write_summary(&summary, None, w));
        assert_eq!(text, "No updates applied.\n");
    }

    #[test]
    fn test_summary_outcomes() {
        let mut summary = RunSummary::new();
        let updates = candidates();
        summary.record(ItemOutcome::committed(updates[1].clone()));
        summary.record(ItemOutcome::rolled_back(
            updates[0].clone(),
            FailureStage::Verify,
            "Tests failed",
        ));
        summary.not_attempted.push(updates[2].clone());
        summary.finish();

        let text = render(|w| {
            plain().write_summary(&summary, Some(Path::new("auto-package-updater.log")), w)
        });

        assert!(text.contains("✓ zod    4.1.13 => 4.3.2 (minor) in web"));
        assert!(text.contains("✗ vitest 3.2.4 => 4.0.16 (major) in root rolled back after tests: Tests failed"));
        assert!(text.contains("- sass   1.96.0 => 1.96.1 (patch) (not attempted)"));
        assert!(text.contains("1 committed, 1 rolled back in "));
        assert!(text.contains("Failures were logged to auto-package-updater.log"));
    }

    #[test]
    fn test_failure_includes_process_output() {
        let error = ItemError::TestsFailed {
            output: CommandOutput::failure("pnpm test", "FAIL src/a.test.ts\n", "ELIFECYCLE\n"),
        };
        let text = render(|w| plain().write_failure(&candidates()[1], &error, w));
        assert_eq!(text, "zod failed: Tests failed\nFAIL src/a.test.ts\nELIFECYCLE\n");
    }

    #[test]
    fn test_render_candidates_contains_every_update() {
        let text = render_candidates(&candidates());
        for name in ["vitest", "zod", "sass"] {
            assert!(text.contains(name));
        }
    }
}
