//! auto-package-updater - dependency updates for JavaScript monorepos
//!
//! This library provides the core functionality for updating the
//! dependencies of a pnpm or npm workspace repository one package at a time:
//! - Package manager detection and outdated package discovery
//! - Workspace, package and version difference filters
//! - Apply → test → commit or roll back, per update
//! - A failure log and run summary

pub mod cli;
pub mod command;
pub mod domain;
pub mod error;
pub mod git;
pub mod orchestrator;
pub mod output;
pub mod package_manager;
pub mod progress;
pub mod run_log;
pub mod selection;
pub mod update;
