//! Workspace type for publishable units inside a monorepo

use serde::{Deserialize, Serialize};
use std::fmt;

/// One independently versioned package inside the repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Workspace {
    /// Package name from the workspace manifest (empty for a single-package repository)
    pub name: String,
    /// Whether this is the root of the repository
    pub is_root: bool,
    /// Whether this is the only workspace, so commands need no targeting
    #[serde(default)]
    pub is_standalone: bool,
}

impl Workspace {
    /// Creates a named, non-root workspace
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_root: false,
            is_standalone: false,
        }
    }

    /// Creates a root workspace
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_root: true,
            is_standalone: false,
        }
    }

    /// Creates the lone, unnamed workspace of a single-package repository
    pub fn standalone() -> Self {
        Self {
            name: String::new(),
            is_root: true,
            is_standalone: true,
        }
    }

    /// Returns true when the manifest gives the workspace no name
    pub fn is_unnamed(&self) -> bool {
        self.name.is_empty()
    }

    /// Mark the first of several workspaces as root, or turn a lone
    /// workspace into the standalone one since it is the whole repository.
    pub fn flag_root(mut workspaces: Vec<Workspace>) -> Vec<Workspace> {
        match workspaces.len() {
            0 => {}
            1 => workspaces[0] = Workspace::standalone(),
            _ => {
                for (index, workspace) in workspaces.iter_mut().enumerate() {
                    workspace.is_root = index == 0;
                    workspace.is_standalone = false;
                }
            }
        }
        workspaces
    }
}

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unnamed() {
            f.write_str("(root)")
        } else {
            f.write_str(&self.name)
        }
    }
}
