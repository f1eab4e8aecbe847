//! Git operations: pre-flight checks, committing kept updates and
//! discarding failed ones

use crate::command::{CommandOutput, CommandRunner};
use crate::error::ItemError;
use crate::run_log::LOG_FILE_NAME;

/// Version control operations the orchestrator relies on
pub trait VersionControl {
    /// Whether the working directory is inside a git work tree
    fn is_inside_work_tree(&self) -> bool;

    /// Whether there are no staged, unstaged or untracked changes, the run
    /// log aside
    fn is_clean(&self) -> Result<bool, ItemError>;

    /// Stage every change except the run log and create exactly one commit
    fn commit_all(&self, message: &str) -> Result<(), ItemError>;

    /// Drop every change since the last commit, untracked files included.
    /// The run log survives.
    fn discard_changes(&self) -> Result<(), ItemError>;
}

/// [`VersionControl`] backed by the `git` executable
pub struct GitRepository<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> GitRepository<'a> {
    /// Create a repository handle; commands run in the runner's directory
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn run_git(&self, args: &[&str]) -> Result<CommandOutput, ItemError> {
        self.runner
            .run("git", args)
            .map_err(|e| ItemError::spawn(format!("git {}", args.join(" ")), e))
    }

    /// Pathspec covering the whole work tree except the run log
    fn pathspec() -> [String; 2] {
        [":/".to_string(), format!(":(exclude){}", LOG_FILE_NAME)]
    }

    fn run_git_on_tree(&self, args: &[&str]) -> Result<CommandOutput, ItemError> {
        let pathspec = Self::pathspec();
        let mut full: Vec<&str> = args.to_vec();
        full.push("--");
        full.extend(pathspec.iter().map(String::as_str));
        self.run_git(&full)
    }

    fn ensure_success(output: CommandOutput) -> Result<(), ItemError> {
        if output.success {
            Ok(())
        } else {
            Err(ItemError::CommitFailed { output })
        }
    }
}

impl VersionControl for GitRepository<'_> {
    fn is_inside_work_tree(&self) -> bool {
        match self.run_git(&["rev-parse", "--is-inside-work-tree"]) {
            Ok(output) => output.success && output.stdout.trim() == "true",
            Err(_) => false,
        }
    }

    fn is_clean(&self) -> Result<bool, ItemError> {
        let output = self.run_git_on_tree(&["status", "--porcelain", "--ignore-submodules"])?;
        if !output.success {
            return Err(ItemError::GitFailed { output });
        }
        Ok(output.stdout.trim().is_empty())
    }

    fn commit_all(&self, message: &str) -> Result<(), ItemError> {
        Self::ensure_success(self.run_git_on_tree(&["add", "--all"])?)?;
        Self::ensure_success(self.run_git(&["commit", "-m", message])?)
    }

    fn discard_changes(&self) -> Result<(), ItemError> {
        let reset = self.run_git(&["reset", "--hard", "HEAD"])?;
        if !reset.success {
            return Err(ItemError::GitFailed { output: reset });
        }
        let clean = self.run_git(&["clean", "-fd", "-e", LOG_FILE_NAME])?;
        if !clean.success {
            return Err(ItemError::GitFailed { output: clean });
        }
        Ok(())
    }
}
