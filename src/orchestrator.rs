//! Update orchestrator for coordinating the entire update workflow
//!
//! This module provides:
//! - Workflow coordination: preflight → discover → filter → select → execute
//! - The per-update state machine: apply → verify → commit or roll back
//! - Failure logging and run summary aggregation

use crate::cli::RunConfig;
use crate::command::{CommandOutput, CommandRunner};
use crate::domain::{FailureStage, ItemOutcome, ItemState, RunSummary, Update};
use crate::error::{AppError, ItemError, PreconditionError, RollbackError};
use crate::git::VersionControl;
use crate::output::Report;
use crate::package_manager::PackageManager;
use crate::progress::Progress;
use crate::run_log::{LogEntry, RunLog};
use crate::selection::Selector;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

/// Check that `root` is a git work tree without uncommitted changes
pub fn preflight(vcs: &dyn VersionControl, root: &Path) -> Result<(), AppError> {
    if !vcs.is_inside_work_tree() {
        return Err(PreconditionError::NotARepository {
            path: root.to_path_buf(),
        }
        .into());
    }

    if !vcs.is_clean().map_err(AppError::Git)? {
        return Err(PreconditionError::DirtyWorkingTree.into());
    }

    Ok(())
}

/// Orchestrator for coordinating the update workflow
pub struct Orchestrator<'a> {
    /// Package manager adapter for the repository
    manager: &'a dyn PackageManager,
    /// Commits kept updates and discards failed ones
    vcs: &'a dyn VersionControl,
    /// Runs the --pre-update and --test commands
    shell: &'a dyn CommandRunner,
    config: RunConfig,
    log: RunLog,
    progress: Progress,
    summary: RunSummary,
}

impl<'a> Orchestrator<'a> {
    /// Create a new orchestrator
    pub fn new(
        manager: &'a dyn PackageManager,
        vcs: &'a dyn VersionControl,
        shell: &'a dyn CommandRunner,
        config: RunConfig,
    ) -> Self {
        let log = RunLog::in_dir(&config.root);
        let progress = Progress::new(!config.debug);

        Self {
            manager,
            vcs,
            shell,
            config,
            log,
            progress,
            summary: RunSummary::new(),
        }
    }

    /// Replace the progress display
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// The failure log of this run
    pub fn run_log(&self) -> &RunLog {
        &self.log
    }

    /// Outcomes recorded so far; after an aborted batch this holds the
    /// partial result
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Run the update workflow. Preflight must already have passed.
    pub fn run(&mut self, selector: &mut dyn Selector) -> Result<RunSummary, AppError> {
        self.log.reset().map_err(|source| AppError::RunLog {
            path: self.log.path().to_path_buf(),
            source,
        })?;

        let candidates = self.discover()?;

        let selected = selector.select(&candidates).map_err(AppError::Selection)?;
        if selected.is_empty() {
            info!("no updates selected");
            self.summary.finish();
            return Ok(std::mem::take(&mut self.summary));
        }
        info!(count = selected.len(), "updates selected");

        self.progress.spinner("Installing packages...");
        let installed = self.manager.install_all();
        self.progress.finish_and_clear();
        installed.map_err(AppError::Install)?;

        self.execute(selected)?;
        Ok(std::mem::take(&mut self.summary))
    }

    /// List workspaces and outdated packages, then apply the filters
    pub fn discover(&mut self) -> Result<Vec<Update>, AppError> {
        let criteria = &self.config.criteria;

        let all = self.manager.list_workspaces()?;
        debug!(count = all.len(), manager = %self.manager.kind(), "workspaces discovered");

        let workspaces = criteria.workspaces(all);
        if workspaces.is_empty() {
            return Err(PreconditionError::NoMatchingWorkspaces {
                filter: criteria.workspace_names.clone(),
            }
            .into());
        }

        self.progress
            .start(workspaces.len() as u64, "Checking for outdated packages");
        let mut found = Vec::new();
        for workspace in &workspaces {
            self.progress.set_message(&format!("Checking {}", workspace));
            match self.manager.list_outdated(workspace) {
                Ok(updates) => {
                    debug!(workspace = %workspace, count = updates.len(), "outdated packages listed");
                    found.extend(updates);
                    self.progress.inc();
                }
                Err(e) => {
                    self.progress.finish_and_clear();
                    return Err(e.into());
                }
            }
        }
        self.progress.finish_and_clear();

        let candidates = criteria.updates(found);
        if candidates.is_empty() {
            return Err(PreconditionError::NoUpdates.into());
        }
        info!(count = candidates.len(), "candidate updates");
        Ok(candidates)
    }

    /// Drive every update of `batch` to a terminal state, in order.
    ///
    /// Stops at the first failed rollback; the rest of the batch is recorded
    /// as not attempted.
    pub fn execute(&mut self, batch: Vec<Update>) -> Result<(), AppError> {
        let mut pending = batch.into_iter();

        while let Some(update) = pending.next() {
            self.progress.spinner(&format!("Updating {}", update));

            match self.process(&update) {
                Ok(()) => {
                    self.progress.succeed(&format!("{}", update));
                    self.summary.record(ItemOutcome::committed(update));
                }
                Err((stage, error)) => {
                    warn!(package = %update.package_name, %stage, %error, "update failed, rolling back");
                    self.progress.finish_and_clear();
                    let _ = Report::default().write_failure(&update, &error, &mut io::stderr().lock());
                    self.progress.spinner(&format!("Rolling back {}", update));
                    let rolled_back = self.rollback();
                    // The entry is written once the work tree is back at HEAD
                    self.append_log(&update, error.to_string(), error.output())?;

                    if let Err(rollback) = rolled_back {
                        self.progress.fail(&format!("{}: rollback failed", update));
                        warn!(package = %update.package_name, error = %rollback, "rollback failed, aborting");
                        self.append_log(
                            &update,
                            format!("Rollback failed: {}", rollback),
                            rollback.output(),
                        )?;

                        self.summary.not_attempted = pending.collect();
                        self.summary.finish();
                        return Err(RollbackError {
                            update,
                            stage,
                            source: rollback,
                        }
                        .into());
                    }

                    transition(&update, ItemState::from(stage), ItemState::RolledBack);
                    self.progress
                        .fail(&format!("{}: rolled back after {}", update, stage));
                    self.summary
                        .record(ItemOutcome::rolled_back(update, stage, error.to_string()));
                }
            }
        }

        self.summary.finish();
        Ok(())
    }

    /// Apply, verify and commit one update
    fn process(&self, update: &Update) -> Result<(), (FailureStage, ItemError)> {
        transition(update, ItemState::Pending, ItemState::Applying);

        if let Some(command) = &self.config.pre_update_command {
            self.run_custom(command, |output| ItemError::PreUpdateFailed { output })
                .map_err(|e| (FailureStage::PreUpdate, e))?;
        }
        self.manager
            .apply_one(update)
            .map_err(|e| (FailureStage::Apply, e))?;

        transition(update, ItemState::Applying, ItemState::Verifying);

        match &self.config.test_command {
            Some(command) => {
                self.run_custom(command, |output| ItemError::CustomTestFailed { output })
            }
            None => self.manager.run_tests(),
        }
        .map_err(|e| (FailureStage::Verify, e))?;

        self.vcs
            .commit_all(&update.commit_message())
            .map_err(|e| (FailureStage::Commit, e))?;

        transition(update, ItemState::Verifying, ItemState::Committed);
        Ok(())
    }

    /// Restore the last commit and reinstall its dependencies
    fn rollback(&self) -> Result<(), ItemError> {
        self.vcs.discard_changes()?;
        self.manager.install_all()
    }

    fn run_custom(
        &self,
        command: &str,
        on_failure: fn(CommandOutput) -> ItemError,
    ) -> Result<(), ItemError> {
        let output = self
            .shell
            .run_shell(command)
            .map_err(|e| ItemError::spawn(command, e))?;

        if output.success {
            Ok(())
        } else {
            Err(on_failure(output))
        }
    }

    fn append_log(
        &self,
        update: &Update,
        message: String,
        output: Option<&CommandOutput>,
    ) -> Result<(), AppError> {
        self.log
            .append(&LogEntry {
                update,
                message,
                output,
            })
            .map_err(|source| AppError::RunLog {
                path: self.log.path().to_path_buf(),
                source,
            })
    }
}

fn transition(update: &Update, from: ItemState, to: ItemState) {
    debug_assert!(from.can_transition_to(to), "illegal transition {from} -> {to}");
    debug!(package = %update.package_name, workspace = %update.workspace, %from, %to, "state transition");
}

impl From<FailureStage> for ItemState {
    /// State the item was in when it failed at `stage`
    fn from(stage: FailureStage) -> Self {
        match stage {
            FailureStage::PreUpdate | FailureStage::Apply => ItemState::Applying,
            FailureStage::Verify | FailureStage::Commit => ItemState::Verifying,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::testing::ScriptedRunner;
    use crate::domain::{VersionDiff, Workspace};
    use crate::error::DiscoveryError;
    use crate::package_manager::PackageManagerKind;
    use crate::selection::SelectAll;
    use crate::update::FilterCriteria;
    use std::cell::{Cell, RefCell};
    use std::fs;
    use std::io;

    #[derive(Default)]
    struct FakeManager {
        workspaces: Vec<Workspace>,
        outdated: Vec<Update>,
        failing_apply: Vec<&'static str>,
        failing_tests: Vec<&'static str>,
        broken_listing: bool,
        /// Number of install_all calls that succeed before every later one fails
        installs_before_failure: Option<usize>,
        installs: Cell<usize>,
        applied: RefCell<Option<String>>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeManager {
        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl PackageManager for FakeManager {
        fn kind(&self) -> PackageManagerKind {
            PackageManagerKind::Pnpm
        }

        fn list_workspaces(&self) -> Result<Vec<Workspace>, DiscoveryError> {
            Ok(self.workspaces.clone())
        }

        fn list_outdated(&self, workspace: &Workspace) -> Result<Vec<Update>, DiscoveryError> {
            if self.broken_listing {
                return Err(DiscoveryError::json_parse("pnpm outdated --json", "EOF"));
            }
            Ok(self
                .outdated
                .iter()
                .filter(|u| u.workspace == *workspace)
                .cloned()
                .collect())
        }

        fn apply_one(&self, update: &Update) -> Result<(), ItemError> {
            self.calls.borrow_mut().push(format!("apply {}", update.package_name));
            if self.failing_apply.contains(&update.package_name.as_str()) {
                return Err(ItemError::ApplyFailed {
                    output: CommandOutput::failure("pnpm add", "", "ERR_PNPM_NO_MATCHING_VERSION"),
                });
            }
            *self.applied.borrow_mut() = Some(update.package_name.clone());
            Ok(())
        }

        fn install_all(&self) -> Result<(), ItemError> {
            self.calls.borrow_mut().push("install".to_string());
            let count = self.installs.get();
            self.installs.set(count + 1);
            match self.installs_before_failure {
                Some(limit) if count >= limit => Err(ItemError::InstallFailed {
                    output: CommandOutput::failure("pnpm install", "", "ENOSPC"),
                }),
                _ => Ok(()),
            }
        }

        fn run_tests(&self) -> Result<(), ItemError> {
            self.calls.borrow_mut().push("test".to_string());
            let applied = self.applied.borrow().clone().unwrap_or_default();
            if self.failing_tests.contains(&applied.as_str()) {
                return Err(ItemError::TestsFailed {
                    output: CommandOutput::failure("pnpm test", "\x1b[31m1 failed\x1b[0m", ""),
                });
            }
            Ok(())
        }
    }

    struct FakeVcs {
        inside: bool,
        clean: bool,
        commit_fails: bool,
        commits: RefCell<Vec<String>>,
        discards: Cell<usize>,
    }

    impl Default for FakeVcs {
        fn default() -> Self {
            Self {
                inside: true,
                clean: true,
                commit_fails: false,
                commits: RefCell::new(Vec::new()),
                discards: Cell::new(0),
            }
        }
    }

    impl VersionControl for FakeVcs {
        fn is_inside_work_tree(&self) -> bool {
            self.inside
        }

        fn is_clean(&self) -> Result<bool, ItemError> {
            Ok(self.clean)
        }

        fn commit_all(&self, message: &str) -> Result<(), ItemError> {
            if self.commit_fails {
                return Err(ItemError::CommitFailed {
                    output: CommandOutput::failure("git commit", "", "hook rejected"),
                });
            }
            self.commits.borrow_mut().push(message.to_string());
            Ok(())
        }

        fn discard_changes(&self) -> Result<(), ItemError> {
            self.discards.set(self.discards.get() + 1);
            Ok(())
        }
    }

    struct SelectNone;

    impl Selector for SelectNone {
        fn select(&mut self, _candidates: &[Update]) -> io::Result<Vec<Update>> {
            Ok(Vec::new())
        }
    }

    fn root() -> Workspace {
        Workspace::root("")
    }

    fn manager_with(outdated: Vec<Update>) -> FakeManager {
        FakeManager {
            workspaces: vec![root()],
            outdated,
            ..Default::default()
        }
    }

    fn update(name: &str, diff: VersionDiff) -> Update {
        Update::new(name, root(), diff, "1.0.0", "2.0.0")
    }

    fn config(dir: &Path) -> RunConfig {
        RunConfig::new(dir)
    }

    fn orchestrator<'a>(
        manager: &'a FakeManager,
        vcs: &'a FakeVcs,
        shell: &'a ScriptedRunner,
        config: RunConfig,
    ) -> Orchestrator<'a> {
        Orchestrator::new(manager, vcs, shell, config).with_progress(Progress::disabled())
    }

    #[test]
    fn test_preflight_not_a_repository() {
        let vcs = FakeVcs {
            inside: false,
            ..Default::default()
        };
        let err = preflight(&vcs, Path::new("/repo")).unwrap_err();
        assert!(matches!(
            err,
            AppError::Precondition(PreconditionError::NotARepository { .. })
        ));
    }

    #[test]
    fn test_preflight_dirty_tree() {
        let vcs = FakeVcs {
            clean: false,
            ..Default::default()
        };
        let err = preflight(&vcs, Path::new("/repo")).unwrap_err();
        assert!(matches!(
            err,
            AppError::Precondition(PreconditionError::DirtyWorkingTree)
        ));
    }

    #[test]
    fn test_preflight_clean_repository() {
        assert!(preflight(&FakeVcs::default(), Path::new("/repo")).is_ok());
    }

    #[test]
    fn test_commit_and_rollback_in_one_batch() {
        let dir = tempfile::tempdir().unwrap();
        let manager = FakeManager {
            failing_tests: vec!["b"],
            ..manager_with(vec![update("a", VersionDiff::Minor), update("b", VersionDiff::Major)])
        };
        let vcs = FakeVcs::default();
        let shell = ScriptedRunner::new();
        let mut orch = orchestrator(&manager, &vcs, &shell, config(dir.path()));

        let summary = orch.run(&mut SelectAll).unwrap();

        assert_eq!(summary.committed_count(), 1);
        assert_eq!(summary.rolled_back_count(), 1);
        assert!(summary.is_complete());
        assert!(summary.outcomes[0].is_committed());
        assert_eq!(summary.outcomes[1].update().package_name, "b");

        assert_eq!(*vcs.commits.borrow(), vec!["Updating package a"]);
        assert_eq!(vcs.discards.get(), 1);
        assert_eq!(
            manager.calls(),
            vec!["install", "apply a", "test", "apply b", "test", "install"]
        );

        let log = fs::read_to_string(orch.run_log().path()).unwrap();
        assert_eq!(log.matches("Package: ").count(), 1);
        assert!(log.contains("Package: b\nWorkspace: (root)\nError: Tests failed\nStdout:\n1 failed\n"));
    }

    #[test]
    fn test_stale_log_removed_at_start() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(vec![update("a", VersionDiff::Patch)]);
        let vcs = FakeVcs::default();
        let shell = ScriptedRunner::new();
        let mut orch = orchestrator(&manager, &vcs, &shell, config(dir.path()));
        fs::write(orch.run_log().path(), "old failure").unwrap();

        orch.run(&mut SelectAll).unwrap();

        assert!(!orch.run_log().exists());
    }

    #[test]
    fn test_empty_selection_mutates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(vec![update("a", VersionDiff::Patch)]);
        let vcs = FakeVcs::default();
        let shell = ScriptedRunner::new();
        let mut orch = orchestrator(&manager, &vcs, &shell, config(dir.path()));

        let summary = orch.run(&mut SelectNone).unwrap();

        assert!(summary.outcomes.is_empty());
        assert!(manager.calls().is_empty());
        assert!(vcs.commits.borrow().is_empty());
    }

    #[test]
    fn test_no_matching_workspaces() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(vec![update("a", VersionDiff::Patch)]);
        let vcs = FakeVcs::default();
        let shell = ScriptedRunner::new();
        let mut cfg = config(dir.path());
        cfg.criteria = FilterCriteria::new().with_workspaces(vec!["web".to_string()]);
        let mut orch = orchestrator(&manager, &vcs, &shell, cfg);

        let err = orch.run(&mut SelectAll).unwrap_err();
        assert!(matches!(
            err,
            AppError::Precondition(PreconditionError::NoMatchingWorkspaces { .. })
        ));
        assert!(manager.calls().is_empty());
    }

    #[test]
    fn test_no_updates_after_filtering() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(vec![update("a", VersionDiff::Major)]);
        let vcs = FakeVcs::default();
        let shell = ScriptedRunner::new();
        let mut cfg = config(dir.path());
        cfg.criteria = FilterCriteria::new().with_max_version_diff(VersionDiff::Minor);
        let mut orch = orchestrator(&manager, &vcs, &shell, cfg);

        let err = orch.run(&mut SelectAll).unwrap_err();
        assert!(matches!(err, AppError::Precondition(PreconditionError::NoUpdates)));
        assert!(err.is_pre_mutation());
    }

    #[test]
    fn test_discovery_error_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let manager = FakeManager {
            broken_listing: true,
            ..manager_with(Vec::new())
        };
        let vcs = FakeVcs::default();
        let shell = ScriptedRunner::new();
        let mut orch = orchestrator(&manager, &vcs, &shell, config(dir.path()));

        let err = orch.run(&mut SelectAll).unwrap_err();
        assert!(matches!(err, AppError::Discovery(DiscoveryError::JsonParse { .. })));
    }

    #[test]
    fn test_discover_lists_each_workspace_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let web = Workspace::new("web");
        let admin = Workspace::new("admin");
        let manager = FakeManager {
            workspaces: vec![Workspace::root("repo"), web.clone(), admin.clone()],
            outdated: vec![
                Update::new("zod", admin, VersionDiff::Minor, "4.1.13", "4.3.2"),
                Update::new("sass", web, VersionDiff::Patch, "1.96.0", "1.96.1"),
            ],
            ..Default::default()
        };
        let vcs = FakeVcs::default();
        let shell = ScriptedRunner::new();
        let mut orch = orchestrator(&manager, &vcs, &shell, config(dir.path()));

        let candidates = orch.discover().unwrap();
        let names: Vec<_> = candidates.iter().map(|u| u.package_name.as_str()).collect();
        assert_eq!(names, vec!["sass", "zod"]);
    }

    #[test]
    fn test_pre_update_failure_skips_apply() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(vec![update("a", VersionDiff::Patch)]);
        let vcs = FakeVcs::default();
        let shell = ScriptedRunner::new().respond(CommandOutput::failure("", "", "no network"));
        let mut cfg = config(dir.path());
        cfg.pre_update_command = Some("git fetch".to_string());
        let mut orch = orchestrator(&manager, &vcs, &shell, cfg);

        let summary = orch.run(&mut SelectAll).unwrap();

        match &summary.outcomes[0] {
            ItemOutcome::RolledBack { stage, message, .. } => {
                assert_eq!(*stage, FailureStage::PreUpdate);
                assert_eq!(message, "Custom command failed: sh -c git fetch");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(manager.calls(), vec!["install", "install"]);
    }

    #[test]
    fn test_custom_test_command_replaces_test_script() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(vec![update("a", VersionDiff::Patch)]);
        let vcs = FakeVcs::default();
        let shell = ScriptedRunner::new();
        let mut cfg = config(dir.path());
        cfg.test_command = Some("make check".to_string());
        let mut orch = orchestrator(&manager, &vcs, &shell, cfg);

        let summary = orch.run(&mut SelectAll).unwrap();

        assert_eq!(summary.committed_count(), 1);
        assert_eq!(shell.calls(), vec!["sh -c make check"]);
        assert!(!manager.calls().contains(&"test".to_string()));
    }

    #[test]
    fn test_failing_custom_test_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(vec![update("a", VersionDiff::Patch)]);
        let vcs = FakeVcs::default();
        let shell = ScriptedRunner::new().respond(CommandOutput::failure("", "lint error", ""));
        let mut cfg = config(dir.path());
        cfg.test_command = Some("make check".to_string());
        let mut orch = orchestrator(&manager, &vcs, &shell, cfg);

        let summary = orch.run(&mut SelectAll).unwrap();

        assert_eq!(summary.rolled_back_count(), 1);
        assert_eq!(vcs.discards.get(), 1);
        let log = fs::read_to_string(orch.run_log().path()).unwrap();
        assert!(log.contains("Error: Custom command failed: sh -c make check\nStdout:\nlint error\n"));
    }

    #[test]
    fn test_apply_failure_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let manager = FakeManager {
            failing_apply: vec!["a"],
            ..manager_with(vec![update("a", VersionDiff::Patch), update("b", VersionDiff::Patch)])
        };
        let vcs = FakeVcs::default();
        let shell = ScriptedRunner::new();
        let mut orch = orchestrator(&manager, &vcs, &shell, config(dir.path()));

        let summary = orch.run(&mut SelectAll).unwrap();

        assert_eq!(summary.outcomes[0].state(), ItemState::RolledBack);
        assert_eq!(summary.outcomes[1].state(), ItemState::Committed);
        assert_eq!(*vcs.commits.borrow(), vec!["Updating package b"]);
    }

    #[test]
    fn test_commit_failure_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with(vec![update("a", VersionDiff::Patch)]);
        let vcs = FakeVcs {
            commit_fails: true,
            ..Default::default()
        };
        let shell = ScriptedRunner::new();
        let mut orch = orchestrator(&manager, &vcs, &shell, config(dir.path()));

        let summary = orch.run(&mut SelectAll).unwrap();

        match &summary.outcomes[0] {
            ItemOutcome::RolledBack { stage, .. } => assert_eq!(*stage, FailureStage::Commit),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(vcs.discards.get(), 1);
    }

    #[test]
    fn test_rollback_failure_aborts_batch() {
        let dir = tempfile::tempdir().unwrap();
        let manager = FakeManager {
            failing_tests: vec!["a"],
            installs_before_failure: Some(1),
            ..manager_with(vec![
                update("a", VersionDiff::Patch),
                update("b", VersionDiff::Patch),
                update("c", VersionDiff::Patch),
            ])
        };
        let vcs = FakeVcs::default();
        let shell = ScriptedRunner::new();
        let mut orch = orchestrator(&manager, &vcs, &shell, config(dir.path()));

        let err = orch.run(&mut SelectAll).unwrap_err();

        match &err {
            AppError::Rollback(rollback) => {
                assert_eq!(rollback.update.package_name, "a");
                assert_eq!(rollback.stage, FailureStage::Verify);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!err.is_pre_mutation());

        let partial = orch.summary();
        assert!(partial.outcomes.is_empty());
        let skipped: Vec<_> = partial.not_attempted.iter().map(|u| u.package_name.as_str()).collect();
        assert_eq!(skipped, vec!["b", "c"]);

        let log = fs::read_to_string(orch.run_log().path()).unwrap();
        assert_eq!(log.matches("Package: a\n").count(), 2);
        assert!(log.contains("Error: Rollback failed: Failed to install packages: pnpm install"));
    }

    #[test]
    fn test_initial_install_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let manager = FakeManager {
            installs_before_failure: Some(0),
            ..manager_with(vec![update("a", VersionDiff::Patch)])
        };
        let vcs = FakeVcs::default();
        let shell = ScriptedRunner::new();
        let mut orch = orchestrator(&manager, &vcs, &shell, config(dir.path()));

        let err = orch.run(&mut SelectAll).unwrap_err();
        assert!(matches!(err, AppError::Install(ItemError::InstallFailed { .. })));
        assert_eq!(manager.calls(), vec!["install"]);
    }

    #[test]
    fn test_named_workspace_commit_message() {
        let dir = tempfile::tempdir().unwrap();
        let web = Workspace::new("web");
        let manager = FakeManager {
            workspaces: vec![Workspace::root("repo"), web.clone()],
            outdated: vec![Update::new("zod", web, VersionDiff::Minor, "4.1.13", "4.3.2")],
            ..Default::default()
        };
        let vcs = FakeVcs::default();
        let shell = ScriptedRunner::new();
        let mut orch = orchestrator(&manager, &vcs, &shell, config(dir.path()));

        orch.run(&mut SelectAll).unwrap();
        assert_eq!(*vcs.commits.borrow(), vec!["Updating package zod in web"]);
    }

    #[test]
    fn test_failure_stage_to_state() {
        assert_eq!(ItemState::from(FailureStage::PreUpdate), ItemState::Applying);
        assert_eq!(ItemState::from(FailureStage::Apply), ItemState::Applying);
        assert_eq!(ItemState::from(FailureStage::Verify), ItemState::Verifying);
        assert_eq!(ItemState::from(FailureStage::Commit), ItemState::Verifying);
    }
}
