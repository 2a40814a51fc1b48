//! Shared types for the Causeway event chain.
//!
//! This crate provides the payload structures handed to Causeway by the
//! review host's event listeners, and the [`Lineage`] axis along which event
//! causality is tracked. The ledger crate depends on these types; nothing
//! here touches storage.
//!
//! Lineage keys are always derived from an event payload's own fields
//! (see [`ChangeEvent::lineage_key`]), never from caller-supplied strings,
//! so the key recorded in the ledger always matches the event that was
//! actually produced.

use serde::{Deserialize, Serialize};

/// Where a change lives in the review host.
///
/// Review hosts name repositories hierarchically with `/` separators
/// (`team/service`); the full name is carried as-is in `repo_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitIdentifier {
    /// Repository (project) name, possibly hierarchical.
    pub repo_name: String,
    /// Target branch of the change.
    pub branch: String,
    /// Commit SHA of the patch set the event describes.
    pub commit_id: String,
}

/// The identity axis along which causality is tracked.
///
/// Branch-scoped lineage chains an event to the last event recorded for its
/// target branch; change-scoped lineage chains to the last event recorded
/// for the specific change, independent of which branch it currently
/// targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lineage {
    /// Key is the branch name.
    #[serde(rename = "BRANCH")]
    Branch,
    /// Key is the change identifier.
    #[serde(rename = "CHANGE")]
    Change,
}

impl Lineage {
    /// Returns the canonical string label for this lineage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Branch => "BRANCH",
            Self::Change => "CHANGE",
        }
    }
}

impl std::fmt::Display for Lineage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Lineage {
    type Err = ParseLineageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BRANCH" => Ok(Self::Branch),
            "CHANGE" => Ok(Self::Change),
            _ => Err(ParseLineageError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown lineage label.
#[derive(Debug, Clone)]
pub struct ParseLineageError(pub String);

impl std::fmt::Display for ParseLineageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown lineage: {}", self.0)
    }
}

impl std::error::Error for ParseLineageError {}

/// Source-change lifecycle events as received from the review host.
///
/// Each variant corresponds to one listener in the host: a change (or new
/// patch set) uploaded for review, and a change merged into its target
/// branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeEvent {
    /// A new change or patch set was uploaded for review.
    SourceChangeCreated {
        /// Repository, branch, and commit of the uploaded patch set.
        git: GitIdentifier,
        /// The host's stable identifier for the logical change.
        change_id: String,
    },

    /// A change was merged into its target branch.
    SourceChangeSubmitted {
        /// Repository, branch, and merge commit.
        git: GitIdentifier,
    },
}

impl ChangeEvent {
    /// Returns the canonical event type string for this payload.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SourceChangeCreated { .. } => "SOURCE_CHANGE_CREATED",
            Self::SourceChangeSubmitted { .. } => "SOURCE_CHANGE_SUBMITTED",
        }
    }

    /// Returns the project (repository) name the event belongs to.
    pub fn project(&self) -> &str {
        match self {
            Self::SourceChangeCreated { git, .. } | Self::SourceChangeSubmitted { git } => {
                &git.repo_name
            }
        }
    }

    /// Returns the lineage along which this event chains to its
    /// predecessor.
    ///
    /// Created events chain per change: the predecessor is the last event
    /// for this specific change regardless of branch. Submitted events
    /// chain per branch.
    pub fn lineage(&self) -> Lineage {
        match self {
            Self::SourceChangeCreated { .. } => Lineage::Change,
            Self::SourceChangeSubmitted { .. } => Lineage::Branch,
        }
    }

    /// Returns the lineage key, derived from the payload's own fields.
    ///
    /// Total and deterministic: the change id for created events, the
    /// target branch for submitted events.
    pub fn lineage_key(&self) -> &str {
        match self {
            Self::SourceChangeCreated { change_id, .. } => change_id,
            Self::SourceChangeSubmitted { git } => &git.branch,
        }
    }
}
