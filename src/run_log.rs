//! Append-only log of failed updates for a single run
//!
//! The file lives in the repository root. It is removed when a run starts,
//! so its presence afterwards means that run had failures.

use crate::command::CommandOutput;
use crate::domain::Update;
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// File name of the run log
pub const LOG_FILE_NAME: &str = "auto-package-updater.log";

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("valid ANSI pattern"));

/// Strip terminal color and cursor sequences from captured output
pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

/// One failure record
#[derive(Debug, Clone)]
pub struct LogEntry<'a> {
    /// The update that failed
    pub update: &'a Update,
    /// Failure message
    pub message: String,
    /// Captured output of the failing process, if any
    pub output: Option<&'a CommandOutput>,
}

impl LogEntry<'_> {
    fn render(&self) -> String {
        let (stdout, stderr) = match self.output {
            Some(output) => (strip_ansi(&output.stdout), strip_ansi(&output.stderr)),
            None => (String::new(), String::new()),
        };

        format!(
            "Package: {}\nWorkspace: {}\nError: {}\nStdout:\n{}\nStderr:\n{}\n\n",
            self.update.package_name,
            self.update.workspace,
            self.message,
            stdout.trim_end(),
            stderr.trim_end()
        )
    }
}

/// Run-scoped failure log
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Log located in `root`
    pub fn in_dir(root: &Path) -> Self {
        Self {
            path: root.join(LOG_FILE_NAME),
        }
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the log left by a previous run
    pub fn reset(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Append one entry followed by a blank line
    pub fn append(&self, entry: &LogEntry<'_>) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(entry.render().as_bytes())?;
        file.flush()
    }

    /// Whether the log file exists
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{VersionDiff, Workspace};

    fn sample_update() -> Update {
        Update::new("zod", Workspace::new("web"), VersionDiff::Minor, "4.1.13", "4.3.2")
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mred\x1b[0m plain"), "red plain");
        assert_eq!(strip_ansi("\x1b[1;32m✓\x1b[22;39m ok"), "✓ ok");
        assert_eq!(strip_ansi("no escapes"), "no escapes");
    }

    #[test]
    fn test_reset_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::in_dir(dir.path());
        assert!(log.reset().is_ok());
        assert!(!log.exists());
    }

    #[test]
    fn test_reset_removes_stale_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::in_dir(dir.path());
        fs::write(log.path(), "stale entry from an earlier run").unwrap();

        log.reset().unwrap();
        assert!(!log.exists());
    }

    #[test]
    fn test_append_entry_format() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::in_dir(dir.path());
        let update = sample_update();
        let output = CommandOutput::failure("pnpm test", "\x1b[31m1 failed\x1b[0m\n", "ELIFECYCLE\n");

        log.append(&LogEntry {
            update: &update,
            message: "Tests failed".to_string(),
            output: Some(&output),
        })
        .unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            content,
            "Package: zod\nWorkspace: web\nError: Tests failed\nStdout:\n1 failed\nStderr:\nELIFECYCLE\n\n"
        );
    }

    #[test]
    fn test_append_is_cumulative() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::in_dir(dir.path());
        let update = sample_update();

        for message in ["first", "second"] {
            log.append(&LogEntry {
                update: &update,
                message: message.to_string(),
                output: None,
            })
            .unwrap();
        }

        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.matches("Package: zod\n").count(), 2);
        let first = content.find("Error: first").unwrap();
        let second = content.find("Error: second").unwrap();
        assert!(first < second);
        assert!(content.ends_with("\n\n"));
    }

    #[test]
    fn test_root_workspace_label() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::in_dir(dir.path());
        let update = Update::new("sass", Workspace::root(""), VersionDiff::Patch, "1.96.0", "1.96.1");

        log.append(&LogEntry {
            update: &update,
            message: "boom".to_string(),
            output: None,
        })
        .unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        assert!(content.contains("Workspace: (root)\n"));
    }
}
