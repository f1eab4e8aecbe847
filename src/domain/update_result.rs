//! Per-update state machine states and terminal outcomes

use super::Update;
use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a single update while the orchestrator drives it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    /// Selected, not started
    Pending,
    /// Pre-update hook and package install in progress
    Applying,
    /// Tests running against the applied change
    Verifying,
    /// Change kept as exactly one commit
    Committed,
    /// Change discarded and dependencies reinstalled
    RolledBack,
}

impl ItemState {
    /// Returns true for `Committed` and `RolledBack`
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemState::Committed | ItemState::RolledBack)
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: ItemState) -> bool {
        matches!(
            (self, next),
            (ItemState::Pending, ItemState::Applying)
                | (ItemState::Applying, ItemState::Verifying)
                | (ItemState::Applying, ItemState::RolledBack)
                | (ItemState::Verifying, ItemState::Committed)
                | (ItemState::Verifying, ItemState::RolledBack)
        )
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ItemState::Pending => "pending",
            ItemState::Applying => "applying",
            ItemState::Verifying => "verifying",
            ItemState::Committed => "committed",
            ItemState::RolledBack => "rolled back",
        };
        f.write_str(label)
    }
}

/// Step at which an update failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// The `--pre-update` command failed
    PreUpdate,
    /// The package manager could not install the new version
    Apply,
    /// Tests failed
    Verify,
    /// Staging or committing the change failed
    Commit,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::PreUpdate => write!(f, "pre-update command"),
            FailureStage::Apply => write!(f, "apply"),
            FailureStage::Verify => write!(f, "tests"),
            FailureStage::Commit => write!(f, "commit"),
        }
    }
}

/// Terminal outcome of one update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemOutcome {
    /// The update passed verification and was committed
    Committed {
        /// The update that was kept
        update: Update,
    },
    /// The update failed and its changes were reverted
    RolledBack {
        /// The update that was reverted
        update: Update,
        /// Where it failed
        stage: FailureStage,
        /// Failure message
        message: String,
    },
}

impl ItemOutcome {
    /// Creates a Committed outcome
    pub fn committed(update: Update) -> Self {
        ItemOutcome::Committed { update }
    }

    /// Creates a RolledBack outcome
    pub fn rolled_back(update: Update, stage: FailureStage, message: impl Into<String>) -> Self {
        ItemOutcome::RolledBack {
            update,
            stage,
            message: message.into(),
        }
    }

    /// Returns true if the update was committed
    pub fn is_committed(&self) -> bool {
        matches!(self, ItemOutcome::Committed { .. })
    }

    /// Returns true if the update was rolled back
    pub fn is_rolled_back(&self) -> bool {
        matches!(self, ItemOutcome::RolledBack { .. })
    }

    /// Returns the update reference
    pub fn update(&self) -> &Update {
        match self {
            ItemOutcome::Committed { update } => update,
            ItemOutcome::RolledBack { update, .. } => update,
        }
    }

    /// Returns the terminal state this outcome corresponds to
    pub fn state(&self) -> ItemState {
        match self {
            ItemOutcome::Committed { .. } => ItemState::Committed,
            ItemOutcome::RolledBack { .. } => ItemState::RolledBack,
        }
    }
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemOutcome::Committed { update } => write!(f, "{}: committed", update),
            ItemOutcome::RolledBack {
                update,
                stage,
                message,
            } => write!(f, "{}: rolled back after {} ({})", update, stage, message),
        }
    }
}
