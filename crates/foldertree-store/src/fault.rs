//! Fault injection for store operations.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use foldertree_core::error::AppError;

/// The remote calls a folder store answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreOperation {
    /// `list_folders`.
    List,
    /// `create_folder`.
    Create,
    /// `rename_folder`.
    Rename,
    /// `move_folder`.
    Move,
    /// `delete_folder`.
    Delete,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Create => write!(f, "create"),
            Self::Rename => write!(f, "rename"),
            Self::Move => write!(f, "move"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Debug, Clone)]
struct Fault {
    message: String,
    persistent: bool,
}

/// Armed failures, at most one per operation.
#[derive(Debug, Clone, Default)]
pub(crate) struct FaultPlan {
    faults: Arc<DashMap<StoreOperation, Fault>>,
}

impl FaultPlan {
    pub(crate) fn arm(&self, op: StoreOperation, message: String, persistent: bool) {
        self.faults.insert(op, Fault { message, persistent });
    }

    pub(crate) fn disarm(&self, op: StoreOperation) {
        self.faults.remove(&op);
    }

    pub(crate) fn clear(&self) {
        self.faults.clear();
    }

    /// The error for `op` if a fault is armed. One-shot faults fire once.
    pub(crate) fn trip(&self, op: StoreOperation) -> Option<AppError> {
        if let Some((_, fault)) = self.faults.remove_if(&op, |_, fault| !fault.persistent) {
            return Some(AppError::remote(fault.message));
        }
        self.faults
            .get(&op)
            .map(|fault| AppError::remote(fault.message.clone()))
    }
}
