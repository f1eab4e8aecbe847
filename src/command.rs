//! Subprocess execution with captured output
//!
//! Every external process (package manager, git, user hooks) is spawned
//! through [`CommandRunner`] so the orchestration logic can be exercised
//! with a scripted runner in tests.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// The command line that was executed
    pub command: String,
    /// Whether the process exited with status 0
    pub success: bool,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Create a successful output
    pub fn success(command: impl Into<String>, stdout: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failed output
    pub fn failure(command: impl Into<String>, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            success: false,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// Trait for spawning processes in the repository root
pub trait CommandRunner {
    /// Run `program` with `args` and capture its output.
    ///
    /// A non-zero exit is not an error here; callers inspect
    /// [`CommandOutput::success`]. `Err` means the process could not be spawned.
    fn run(&self, program: &str, args: &[&str]) -> std::io::Result<CommandOutput>;

    /// Run an arbitrary command line through the user's shell
    fn run_shell(&self, command: &str) -> std::io::Result<CommandOutput>;
}

/// Runner that executes real processes
#[derive(Debug, Clone)]
pub struct SystemCommandRunner {
    working_dir: PathBuf,
}

impl SystemCommandRunner {
    /// Create a runner rooted at `working_dir`
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// Directory every process is spawned in
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn shell() -> String {
        std::env::var("SHELL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "sh".to_string())
    }

    fn capture(&self, command_line: String, command: &mut Command) -> std::io::Result<CommandOutput> {
        tracing::debug!(command = %command_line, "spawning");
        let output = command.current_dir(&self.working_dir).output()?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        tracing::debug!(
            command = %command_line,
            status = ?output.status.code(),
            "finished"
        );

        Ok(CommandOutput {
            command: command_line,
            success: output.status.success(),
            stdout,
            stderr,
        })
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> std::io::Result<CommandOutput> {
        let command_line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.capture(command_line, Command::new(program).args(args))
    }

    fn run_shell(&self, command: &str) -> std::io::Result<CommandOutput> {
        let shell = Self::shell();
        self.capture(command.to_string(), Command::new(shell).args(["-c", command]))
    }
}
