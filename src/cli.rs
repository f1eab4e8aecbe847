//! CLI argument parsing module for auto-package-updater

use crate::domain::VersionDiff;
use crate::error::ConfigError;
use crate::update::FilterCriteria;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Parse a severity threshold: major, minor or patch
fn parse_version_diff(s: &str) -> Result<VersionDiff, String> {
    s.trim()
        .parse()
        .map_err(|e: ConfigError| e.to_string())
}

/// Update the dependencies of a pnpm or npm monorepo one package at a time
#[derive(Parser, Debug, Clone)]
#[command(
    name = "auto-package-updater",
    version,
    about = "Update monorepo dependencies one at a time, committing the ones whose tests pass"
)]
pub struct CliArgs {
    /// Repository root (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub debug: bool,

    // Filters
    /// Only update the given workspace (can be specified multiple times)
    #[arg(short, long, action = ArgAction::Append, value_name = "NAME")]
    pub workspace: Vec<String>,

    /// Only update the given package (can be specified multiple times)
    #[arg(short, long, action = ArgAction::Append, value_name = "NAME")]
    pub package: Vec<String>,

    /// Riskiest version difference still offered: major, minor or patch
    #[arg(short, long, value_parser = parse_version_diff, value_name = "DIFF")]
    pub max_version_diff: Option<VersionDiff>,

    // Commands
    /// Test command to run instead of the package manager's test script
    #[arg(long, value_name = "CMD")]
    pub test: Option<String>,

    /// Command to run before each update is applied
    #[arg(long, value_name = "CMD")]
    pub pre_update: Option<String>,

    /// Apply every candidate update without prompting
    #[arg(short, long)]
    pub yes: bool,
}

/// Settings for a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Repository root; all commands run here
    pub root: PathBuf,
    /// Debug logging requested
    pub debug: bool,
    /// Workspace, package and severity filters
    pub criteria: FilterCriteria,
    /// Replaces the package manager's test script
    pub test_command: Option<String>,
    /// Runs before each update is applied
    pub pre_update_command: Option<String>,
    /// Skip the interactive selection
    pub assume_yes: bool,
}

impl CliArgs {
    /// Filters requested on the command line
    pub fn criteria(&self) -> FilterCriteria {
        let criteria = FilterCriteria::new()
            .with_workspaces(self.workspace.clone())
            .with_packages(self.package.clone());

        match self.max_version_diff {
            Some(max) => criteria.with_max_version_diff(max),
            None => criteria,
        }
    }

    /// Build the run configuration
    pub fn to_config(&self) -> RunConfig {
        RunConfig {
            root: self.path.clone(),
            debug: self.debug,
            criteria: self.criteria(),
            test_command: self.test.clone(),
            pre_update_command: self.pre_update.clone(),
            assume_yes: self.yes,
        }
    }
}

impl RunConfig {
    /// Configuration for `root` with no filters or custom commands
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            debug: false,
            criteria: FilterCriteria::new(),
            test_command: None,
            pre_update_command: None,
            assume_yes: false,
        }
    }
}
