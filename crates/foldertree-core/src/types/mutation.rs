//! Mutation lifecycle types shared by the engine and its event stream.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of folder mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    /// A folder is being created.
    Create,
    /// A folder is being renamed.
    Rename,
    /// A folder is being reparented.
    Move,
    /// A folder subtree is being deleted.
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Rename => write!(f, "rename"),
            Self::Move => write!(f, "move"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Lifecycle state of a single optimistic mutation.
///
/// Every mutation starts `Pending` and ends in exactly one of the two
/// terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationState {
    /// Applied locally, awaiting the remote store.
    Pending,
    /// Confirmed by the remote store.
    Committed,
    /// Rejected by the remote store and reverted locally.
    RolledBack,
}

impl MutationState {
    /// Whether the mutation has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Identifier of a single mutation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MutationId(pub Uuid);

impl MutationId {
    /// Create a new time-ordered mutation id.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MutationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
