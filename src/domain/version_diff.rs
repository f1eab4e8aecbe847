//! Version difference (severity) between an installed and a published version

use crate::error::ConfigError;
use colored::Colorize;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a version bump, ordered `Patch < Minor < Major`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionDiff {
    /// Bug fixes only
    Patch,
    /// Backwards compatible features
    Minor,
    /// Breaking changes
    Major,
}

impl VersionDiff {
    /// Returns all severities from safest to riskiest
    pub fn all() -> &'static [VersionDiff] {
        &[VersionDiff::Patch, VersionDiff::Minor, VersionDiff::Major]
    }

    /// Returns the lowercase label
    pub fn label(&self) -> &'static str {
        match self {
            VersionDiff::Patch => "patch",
            VersionDiff::Minor => "minor",
            VersionDiff::Major => "major",
        }
    }

    /// Get the display label with color
    pub fn colored_label(&self) -> String {
        match self {
            VersionDiff::Major => self.label().red().bold().to_string(),
            VersionDiff::Minor => self.label().yellow().to_string(),
            VersionDiff::Patch => self.label().green().to_string(),
        }
    }

    /// Whether an update of this severity is allowed under a `max` threshold.
    ///
    /// The threshold is inclusive and admits everything at most as risky:
    /// `minor` admits `minor` and `patch` but not `major`.
    pub fn within(&self, max: VersionDiff) -> bool {
        *self <= max
    }

    /// Classify the bump from `current` to `latest`.
    ///
    /// Returns `Ok(None)` when the versions are equal. Differences confined to
    /// prerelease or build metadata classify as `Patch`.
    pub fn between(current: &str, latest: &str) -> Result<Option<VersionDiff>, semver::Error> {
        let current = parse_version(current)?;
        let latest = parse_version(latest)?;

        if current == latest {
            return Ok(None);
        }

        let diff = if current.major != latest.major {
            VersionDiff::Major
        } else if current.minor != latest.minor {
            VersionDiff::Minor
        } else {
            VersionDiff::Patch
        };

        Ok(Some(diff))
    }
}

fn parse_version(raw: &str) -> Result<Version, semver::Error> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(trimmed)
}

impl FromStr for VersionDiff {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patch" => Ok(VersionDiff::Patch),
            "minor" => Ok(VersionDiff::Minor),
            "major" => Ok(VersionDiff::Major),
            _ => Err(ConfigError::InvalidVersionDiff {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for VersionDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
