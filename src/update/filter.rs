//! Workspace and update filters
//!
//! This module provides the FilterCriteria struct that encapsulates the
//! command line filters, and the pure functions applying them.

use crate::domain::{Update, VersionDiff, Workspace};

/// Filter configuration narrowing workspaces and candidate updates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Workspaces to process (empty means all)
    pub workspace_names: Vec<String>,
    /// Packages to offer (empty means all)
    pub package_names: Vec<String>,
    /// Riskiest severity still offered, inclusive
    pub max_version_diff: Option<VersionDiff>,
}

impl FilterCriteria {
    /// Create criteria that restrict nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Set workspaces to process
    pub fn with_workspaces(mut self, names: Vec<String>) -> Self {
        self.workspace_names = names;
        self
    }

    /// Set packages to offer
    pub fn with_packages(mut self, names: Vec<String>) -> Self {
        self.package_names = names;
        self
    }

    /// Set the severity threshold
    pub fn with_max_version_diff(mut self, max: VersionDiff) -> Self {
        self.max_version_diff = Some(max);
        self
    }

    /// Apply the workspace criterion
    pub fn workspaces(&self, all: Vec<Workspace>) -> Vec<Workspace> {
        filter_workspaces(all, &self.workspace_names)
    }

    /// Apply the package and severity criteria
    pub fn updates(&self, all: Vec<Update>) -> Vec<Update> {
        filter_updates(all, &self.package_names, self.max_version_diff)
    }
}

/// Keep workspaces whose name is in `names` (exact, case-sensitive),
/// preserving order. An empty `names` keeps everything.
pub fn filter_workspaces(all: Vec<Workspace>, names: &[String]) -> Vec<Workspace> {
    if names.is_empty() {
        return all;
    }

    all.into_iter()
        .filter(|workspace| names.iter().any(|name| *name == workspace.name))
        .collect()
}

/// Narrow candidates by severity threshold, then by package name.
///
/// `max_version_diff` admits updates at most as risky as the threshold. Both
/// stages preserve order and compose conjunctively; with neither criterion
/// the input is returned unchanged.
pub fn filter_updates(
    all: Vec<Update>,
    package_names: &[String],
    max_version_diff: Option<VersionDiff>,
) -> Vec<Update> {
    let by_severity: Vec<Update> = match max_version_diff {
        Some(max) => all
            .into_iter()
            .filter(|update| update.version_diff.within(max))
            .collect(),
        None => all,
    };

    if package_names.is_empty() {
        return by_severity;
    }

    by_severity
        .into_iter()
        .filter(|update| package_names.iter().any(|name| *name == update.package_name))
        .collect()
}
