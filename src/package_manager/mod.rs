//! Package manager adapters
//!
//! This module provides:
//! - Detection of the package manager governing the repository
//! - A manager-agnostic [`PackageManager`] trait for listing and applying updates
//! - One implementation per supported manager, selected by [`PackageManagerKind`]

mod npm;
mod pnpm;

pub use npm::Npm;
pub use pnpm::Pnpm;

use crate::command::{CommandOutput, CommandRunner};
use crate::domain::{Update, VersionDiff, Workspace};
use crate::error::{DiscoveryError, ItemError, PreconditionError};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Supported package managers, in detection precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManagerKind {
    /// pnpm (pnpm-lock.yaml)
    Pnpm,
    /// npm (package-lock.json)
    Npm,
}

impl PackageManagerKind {
    /// Returns all supported managers in detection order
    pub fn all() -> &'static [PackageManagerKind] {
        &[PackageManagerKind::Pnpm, PackageManagerKind::Npm]
    }

    /// Returns the lockfile that marks this manager
    pub fn lockfile(&self) -> &'static str {
        match self {
            PackageManagerKind::Pnpm => "pnpm-lock.yaml",
            PackageManagerKind::Npm => "package-lock.json",
        }
    }

    /// Returns the executable name
    pub fn program(&self) -> &'static str {
        match self {
            PackageManagerKind::Pnpm => "pnpm",
            PackageManagerKind::Npm => "npm",
        }
    }

    /// Detect the manager from lockfiles in `root`; the first marker present wins
    pub fn detect(root: &Path) -> Result<PackageManagerKind, PreconditionError> {
        PackageManagerKind::all()
            .iter()
            .copied()
            .find(|kind| root.join(kind.lockfile()).is_file())
            .ok_or_else(|| PreconditionError::NoPackageManager {
                path: root.to_path_buf(),
            })
    }

    /// Build the adapter for this manager
    pub fn adapter<'a>(
        &self,
        runner: &'a dyn CommandRunner,
        root: &Path,
    ) -> Box<dyn PackageManager + 'a> {
        match self {
            PackageManagerKind::Pnpm => Box::new(Pnpm::new(runner)),
            PackageManagerKind::Npm => Box::new(Npm::new(runner, root)),
        }
    }
}

impl fmt::Display for PackageManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Operations the orchestrator needs from a package manager
pub trait PackageManager {
    /// Which manager this adapter drives
    fn kind(&self) -> PackageManagerKind;

    /// Enumerate workspaces; with several, the first is the root, and a lone
    /// workspace has its name cleared
    fn list_workspaces(&self) -> Result<Vec<Workspace>, DiscoveryError>;

    /// Outdated, non-deprecated dependencies of one workspace
    fn list_outdated(&self, workspace: &Workspace) -> Result<Vec<Update>, DiscoveryError>;

    /// Install exactly one package at its latest version, pinned exactly
    fn apply_one(&self, update: &Update) -> Result<(), ItemError>;

    /// Reinstall everything from the lockfile
    fn install_all(&self) -> Result<(), ItemError>;

    /// Run the manager's default test script
    fn run_tests(&self) -> Result<(), ItemError>;
}

/// One package row of an `outdated --json` listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OutdatedEntry {
    #[serde(default)]
    pub current: Option<String>,
    #[serde(default)]
    pub latest: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
}

/// Turn listing rows into candidate updates for `workspace`.
///
/// Deprecated packages are dropped. Rows whose versions are equal are
/// dropped too. A missing or non-semver version is fatal.
pub(crate) fn updates_from_entries<I>(
    workspace: &Workspace,
    entries: I,
) -> Result<Vec<Update>, DiscoveryError>
where
    I: IntoIterator<Item = (String, OutdatedEntry)>,
{
    let mut updates = Vec::new();

    for (package, entry) in entries {
        if entry.is_deprecated {
            tracing::debug!(%package, "skipping deprecated package");
            continue;
        }

        let current = entry.current.unwrap_or_default();
        let latest = entry.latest.unwrap_or_default();

        let diff = VersionDiff::between(&current, &latest).map_err(|e| {
            DiscoveryError::invalid_version(&package, &current, &latest, e.to_string())
        })?;

        let Some(diff) = diff else {
            tracing::debug!(%package, %current, "already at latest");
            continue;
        };

        updates.push(Update::new(package, workspace.clone(), diff, current, latest));
    }

    Ok(updates)
}

/// Run a listing command whose stdout is parsed regardless of exit status.
///
/// `outdated` commands exit non-zero when anything is outdated, so only a
/// failure with nothing on stdout is treated as an error.
pub(crate) fn run_listing(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[&str],
) -> Result<CommandOutput, DiscoveryError> {
    let command_line = format!("{} {}", program, args.join(" "));
    let output = runner
        .run(program, args)
        .map_err(|e| DiscoveryError::command_failed(&command_line, e.to_string()))?;

    if !output.success && output.stdout.trim().is_empty() {
        return Err(DiscoveryError::command_failed(
            command_line,
            output.stderr.trim().to_string(),
        ));
    }

    Ok(output)
}

/// Run a mutating step, mapping a non-zero exit with `on_failure`
pub(crate) fn run_step(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[&str],
    on_failure: fn(CommandOutput) -> ItemError,
) -> Result<(), ItemError> {
    let output = runner
        .run(program, args)
        .map_err(|e| ItemError::spawn(format!("{} {}", program, args.join(" ")), e))?;

    if output.success {
        Ok(())
    } else {
        Err(on_failure(output))
    }
}
