//! Application error types using thiserror
//!
//! Error hierarchy:
//! - PreconditionError: the run cannot start (fatal, nothing mutated)
//! - ConfigError: invalid command line configuration (fatal, nothing mutated)
//! - DiscoveryError: package manager output cannot be trusted (fatal, nothing mutated)
//! - ItemError: one update failed (recoverable, the batch continues)
//! - RollbackError: restoring a failed update failed (fatal, batch aborted)

use crate::command::CommandOutput;
use crate::domain::{FailureStage, Update};
use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Run preconditions not met
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Workspace or outdated listing could not be interpreted
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Recovery from a failed update failed
    #[error(transparent)]
    Rollback(#[from] RollbackError),

    /// Run log could not be written
    #[error("failed to write run log {path}: {source}")]
    RunLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the operator's selection failed
    #[error("failed to read selection: {0}")]
    Selection(#[source] std::io::Error),

    /// Checking the working tree failed
    #[error("failed to inspect the working tree: {0}")]
    Git(#[source] ItemError),

    /// The install before the first update failed
    #[error("initial install failed: {0}")]
    Install(#[source] ItemError),
}

/// Conditions checked before anything is modified
#[derive(Error, Debug)]
pub enum PreconditionError {
    /// Not inside a git work tree
    #[error("not in a git repository: {path}")]
    NotARepository { path: PathBuf },

    /// Uncommitted changes present
    #[error("repository is not in a pristine state; commit or stash your changes before running this command")]
    DirtyWorkingTree,

    /// No known lockfile found
    #[error("no or unknown package manager detected in {path}; run this command in the root of a project with a pnpm-lock.yaml or package-lock.json")]
    NoPackageManager { path: PathBuf },

    /// Workspace filter matched nothing
    #[error("no workspaces match the filter: {}", .filter.join(", "))]
    NoMatchingWorkspaces { filter: Vec<String> },

    /// Nothing outdated after filtering
    #[error("no updates available")]
    NoUpdates,
}

/// Errors related to configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Unknown severity for --max-version-diff
    #[error("invalid --max-version-diff: \"{value}\". Valid values are \"major\", \"minor\", \"patch\"")]
    InvalidVersionDiff { value: String },
}

/// Errors interpreting package manager listings
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// A listing command could not be spawned or failed outright
    #[error("`{command}` failed: {message}")]
    CommandFailed { command: String, message: String },

    /// Output was not the expected JSON
    #[error("failed to parse JSON output of {context}: {message}")]
    JsonParse { context: String, message: String },

    /// Current/latest pair is not valid semantic versioning
    #[error("cannot compare versions of '{package}' ({current} => {latest}): {message}; is the package installed?")]
    InvalidVersion {
        package: String,
        current: String,
        latest: String,
        message: String,
    },

    /// Root manifest could not be read
    #[error("failed to read {path}: {message}")]
    ManifestRead { path: PathBuf, message: String },
}

/// Failure of a single update; the batch continues after rollback
#[derive(Error, Debug)]
pub enum ItemError {
    /// The --pre-update command exited non-zero
    #[error("Custom command failed: {}", .output.command)]
    PreUpdateFailed { output: CommandOutput },

    /// Installing the new version failed
    #[error("Failed to apply update: {}", .output.command)]
    ApplyFailed { output: CommandOutput },

    /// The package manager's test script failed
    #[error("Tests failed")]
    TestsFailed { output: CommandOutput },

    /// The --test command exited non-zero
    #[error("Custom command failed: {}", .output.command)]
    CustomTestFailed { output: CommandOutput },

    /// git add/commit failed
    #[error("Failed to commit update: {}", .output.command)]
    CommitFailed { output: CommandOutput },

    /// A full reinstall failed
    #[error("Failed to install packages: {}", .output.command)]
    InstallFailed { output: CommandOutput },

    /// A git command other than add/commit failed
    #[error("git command failed: {}", .output.command)]
    GitFailed { output: CommandOutput },

    /// The process could not be started at all
    #[error("failed to execute `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Restoring the pre-update state failed; dependency state is no longer trustworthy
#[derive(Error, Debug)]
#[error("rollback of {update} failed after {stage} error: {source}")]
pub struct RollbackError {
    /// The update being rolled back
    pub update: Update,
    /// Stage where the update originally failed
    pub stage: FailureStage,
    /// The failure of the recovery step
    #[source]
    pub source: ItemError,
}

impl DiscoveryError {
    /// Creates a new JsonParse error
    pub fn json_parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        DiscoveryError::JsonParse {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidVersion error
    pub fn invalid_version(
        package: impl Into<String>,
        current: impl Into<String>,
        latest: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        DiscoveryError::InvalidVersion {
            package: package.into(),
            current: current.into(),
            latest: latest.into(),
            message: message.into(),
        }
    }

    /// Creates a new CommandFailed error
    pub fn command_failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        DiscoveryError::CommandFailed {
            command: command.into(),
            message: message.into(),
        }
    }
}

impl ItemError {
    /// Captured process output, if a process ran
    pub fn output(&self) -> Option<&CommandOutput> {
        match self {
            ItemError::PreUpdateFailed { output }
            | ItemError::ApplyFailed { output }
            | ItemError::TestsFailed { output }
            | ItemError::CustomTestFailed { output }
            | ItemError::CommitFailed { output }
            | ItemError::InstallFailed { output }
            | ItemError::GitFailed { output } => Some(output),
            ItemError::Spawn { .. } => None,
        }
    }

    /// Creates a new Spawn error
    pub fn spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        ItemError::Spawn {
            command: command.into(),
            source,
        }
    }
}

impl AppError {
    /// Whether the error aborted the run before anything was modified
    pub fn is_pre_mutation(&self) -> bool {
        matches!(
            self,
            AppError::Precondition(_)
                | AppError::Config(_)
                | AppError::Discovery(_)
                | AppError::Git(_)
        )
    }
}
