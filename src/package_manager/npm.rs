//! npm adapter

use super::{run_listing, run_step, updates_from_entries, OutdatedEntry, PackageManager, PackageManagerKind};
use crate::command::CommandRunner;
use crate::domain::{Update, Workspace};
use crate::error::{DiscoveryError, ItemError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const PROGRAM: &str = "npm";

/// The parts of the root package.json needed for workspace discovery
#[derive(Debug, Default, Deserialize)]
struct RootManifest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    workspaces: Option<serde_json::Value>,
}

/// Workspace row of `npm query .workspace --json`
#[derive(Debug, Deserialize)]
struct NpmWorkspace {
    #[serde(default)]
    name: Option<String>,
}

/// `npm outdated --json` reports an array when a package is outdated in
/// several locations
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OutdatedRow {
    One(OutdatedEntry),
    Many(Vec<OutdatedEntry>),
}

impl OutdatedRow {
    fn into_first(self) -> Option<OutdatedEntry> {
        match self {
            OutdatedRow::One(entry) => Some(entry),
            OutdatedRow::Many(entries) => entries.into_iter().next(),
        }
    }
}

/// Adapter driving the `npm` CLI
pub struct Npm<'a> {
    runner: &'a dyn CommandRunner,
    root: PathBuf,
}

impl<'a> Npm<'a> {
    /// Create an npm adapter for the repository at `root`
    pub fn new(runner: &'a dyn CommandRunner, root: &Path) -> Self {
        Self {
            runner,
            root: root.to_path_buf(),
        }
    }

    fn read_root_manifest(&self) -> Result<RootManifest, DiscoveryError> {
        let path = self.root.join("package.json");
        let content = std::fs::read_to_string(&path).map_err(|e| DiscoveryError::ManifestRead {
            path: path.clone(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&content)
            .map_err(|e| DiscoveryError::json_parse(path.display().to_string(), e.to_string()))
    }

    /// The root is npm's default target, so only non-root workspaces are qualified
    fn target_args(workspace: &Workspace) -> Vec<&str> {
        if workspace.is_unnamed() || workspace.is_root {
            Vec::new()
        } else {
            vec!["--workspace", workspace.name.as_str()]
        }
    }
}

impl PackageManager for Npm<'_> {
    fn kind(&self) -> PackageManagerKind {
        PackageManagerKind::Npm
    }

    fn list_workspaces(&self) -> Result<Vec<Workspace>, DiscoveryError> {
        let manifest = self.read_root_manifest()?;
        let mut workspaces = vec![Workspace::new(manifest.name.unwrap_or_default())];

        if manifest.workspaces.is_some() {
            let args = ["query", ".workspace", "--json"];
            let output = run_listing(self.runner, PROGRAM, &args)?;
            let members: Vec<NpmWorkspace> = serde_json::from_str(&output.stdout)
                .map_err(|e| DiscoveryError::json_parse("npm query .workspace --json", e.to_string()))?;

            workspaces.extend(
                members
                    .into_iter()
                    .map(|m| Workspace::new(m.name.unwrap_or_default())),
            );
        }

        Ok(Workspace::flag_root(workspaces))
    }

    fn list_outdated(&self, workspace: &Workspace) -> Result<Vec<Update>, DiscoveryError> {
        let mut args = vec!["outdated", "--json"];
        args.extend(Self::target_args(workspace));

        let output = run_listing(self.runner, PROGRAM, &args)?;
        if output.stdout.trim().is_empty() {
            return Ok(Vec::new());
        }

        let rows: BTreeMap<String, OutdatedRow> = serde_json::from_str(&output.stdout).map_err(|e| {
            DiscoveryError::json_parse(format!("npm outdated for workspace {}", workspace), e.to_string())
        })?;

        let entries = rows
            .into_iter()
            .filter_map(|(package, row)| row.into_first().map(|entry| (package, entry)));

        updates_from_entries(workspace, entries)
    }

    fn apply_one(&self, update: &Update) -> Result<(), ItemError> {
        let spec = update.install_spec();
        let mut args = vec!["install", spec.as_str(), "--save-exact"];
        args.extend(Self::target_args(&update.workspace));

        run_step(self.runner, PROGRAM, &args, |output| ItemError::ApplyFailed { output })
    }

    fn install_all(&self) -> Result<(), ItemError> {
        run_step(self.runner, PROGRAM, &["ci"], |output| ItemError::InstallFailed { output })
    }

    fn run_tests(&self) -> Result<(), ItemError> {
        run_step(self.runner, PROGRAM, &["test"], |output| ItemError::TestsFailed { output })
    }
}
