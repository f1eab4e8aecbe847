//! Candidate update filtering
//!
//! This module provides:
//! - Filter criteria built from the command line
//! - Workspace name filtering
//! - Package name and severity threshold filtering

mod filter;

pub use filter::{filter_updates, filter_workspaces, FilterCriteria};
