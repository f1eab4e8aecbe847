//! pnpm adapter

use super::{run_listing, run_step, updates_from_entries, OutdatedEntry, PackageManager, PackageManagerKind};
use crate::command::CommandRunner;
use crate::domain::{Update, Workspace};
use crate::error::{DiscoveryError, ItemError};
use serde::Deserialize;
use std::collections::BTreeMap;

const PROGRAM: &str = "pnpm";

/// Project row of `pnpm list -r --depth -1 --json`
#[derive(Debug, Deserialize)]
struct PnpmProject {
    #[serde(default)]
    name: Option<String>,
}

/// Adapter driving the `pnpm` CLI
pub struct Pnpm<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Pnpm<'a> {
    /// Create a pnpm adapter
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Targeting flags for a workspace: none for a lone package, `-w` for the
    /// root of a workspace (named or not), `--filter <name>` otherwise
    fn target_args(workspace: &Workspace) -> Vec<&str> {
        if workspace.is_standalone {
            Vec::new()
        } else if workspace.is_root {
            vec!["-w"]
        } else {
            vec!["--filter", workspace.name.as_str()]
        }
    }
}

impl PackageManager for Pnpm<'_> {
    fn kind(&self) -> PackageManagerKind {
        PackageManagerKind::Pnpm
    }

    fn list_workspaces(&self) -> Result<Vec<Workspace>, DiscoveryError> {
        let args = ["list", "-r", "--depth", "-1", "--json"];
        let output = run_listing(self.runner, PROGRAM, &args)?;

        let projects: Vec<PnpmProject> = serde_json::from_str(&output.stdout)
            .map_err(|e| DiscoveryError::json_parse("pnpm list -r --depth -1 --json", e.to_string()))?;

        let workspaces = projects
            .into_iter()
            .map(|p| Workspace::new(p.name.unwrap_or_default()))
            .collect();

        Ok(Workspace::flag_root(workspaces))
    }

    fn list_outdated(&self, workspace: &Workspace) -> Result<Vec<Update>, DiscoveryError> {
        let mut args = vec!["outdated", "--json"];
        if !workspace.is_unnamed() {
            args.extend(["--filter", workspace.name.as_str()]);
        }

        let output = run_listing(self.runner, PROGRAM, &args)?;
        if output.stdout.trim().is_empty() {
            return Ok(Vec::new());
        }

        let entries: BTreeMap<String, OutdatedEntry> = serde_json::from_str(&output.stdout)
            .map_err(|e| {
                DiscoveryError::json_parse(format!("pnpm outdated for workspace {}", workspace), e.to_string())
            })?;

        updates_from_entries(workspace, entries)
    }

    fn apply_one(&self, update: &Update) -> Result<(), ItemError> {
        let spec = update.install_spec();
        let mut args = Self::target_args(&update.workspace);
        args.extend(["add", spec.as_str(), "--save-exact"]);

        run_step(self.runner, PROGRAM, &args, |output| ItemError::ApplyFailed { output })
    }

    fn install_all(&self) -> Result<(), ItemError> {
        run_step(self.runner, PROGRAM, &["install"], |output| ItemError::InstallFailed { output })
    }

    fn run_tests(&self) -> Result<(), ItemError> {
        run_step(self.runner, PROGRAM, &["test"], |output| ItemError::TestsFailed { output })
    }
}
