//! Candidate update produced from a workspace's outdated listing

use super::{VersionDiff, Workspace};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A package in a workspace that is behind its latest published version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    /// Package name as published to the registry
    pub package_name: String,
    /// Workspace that declares the dependency
    pub workspace: Workspace,
    /// Severity of the bump
    pub version_diff: VersionDiff,
    /// Installed version
    pub current_version: String,
    /// Latest published version
    pub latest_version: String,
}

impl Update {
    /// Creates a new Update
    pub fn new(
        package_name: impl Into<String>,
        workspace: Workspace,
        version_diff: VersionDiff,
        current_version: impl Into<String>,
        latest_version: impl Into<String>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            workspace,
            version_diff,
            current_version: current_version.into(),
            latest_version: latest_version.into(),
        }
    }

    /// Install specifier pinning the latest version, e.g. `zod@4.3.2`
    pub fn install_spec(&self) -> String {
        format!("{}@{}", self.package_name, self.latest_version)
    }

    /// Commit message recorded when this update is kept
    pub fn commit_message(&self) -> String {
        let mut message = format!("Updating package {}", self.package_name);
        if !self.workspace.is_unnamed() {
            message.push_str(&format!(" in {}", self.workspace.name));
        }
        message
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} => {} ({})",
            self.package_name, self.current_version, self.latest_version, self.version_diff
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_update(workspace: Workspace) -> Update {
        Update::new("vitest", workspace, VersionDiff::Major, "3.2.4", "4.0.16")
    }

    #[test]
    fn test_display() {
        let update = sample_update(Workspace::root("root"));
        assert_eq!(update.to_string(), "vitest 3.2.4 => 4.0.16 (major)");
    }

    #[test]
    fn test_install_spec() {
        let update = sample_update(Workspace::new("web"));
        assert_eq!(update.install_spec(), "vitest@4.0.16");
    }

    #[test]
    fn test_commit_message_named_workspace() {
        let update = sample_update(Workspace::new("@repo/utils"));
        assert_eq!(update.commit_message(), "Updating package vitest in @repo/utils");
    }

    #[test]
    fn test_commit_message_unnamed_workspace() {
        let update = sample_update(Workspace::root(""));
        assert_eq!(update.commit_message(), "Updating package vitest");
    }

    #[test]
    fn test_serde_update() {
        let update = sample_update(Workspace::new("web"));
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains("\"version_diff\":\"major\""));
        let parsed: Update = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, update);
    }
}
