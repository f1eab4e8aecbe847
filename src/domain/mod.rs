//! Core domain models for auto-package-updater
//!
//! This module contains the fundamental types used throughout the application:
//! - Version difference (severity) between installed and latest versions
//! - Workspaces discovered in the repository
//! - Candidate updates
//! - Per-update states, outcomes and the run summary

mod summary;
mod update;
mod update_result;
mod version_diff;
mod workspace;

pub use summary::RunSummary;
pub use update::Update;
pub use update_result::{FailureStage, ItemOutcome, ItemState};
pub use version_diff::VersionDiff;
pub use workspace::Workspace;
