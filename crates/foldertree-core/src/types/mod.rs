//! Core type definitions used across the FolderTree workspace.

pub mod id;
pub mod mutation;

pub use id::*;
pub use mutation::{MutationId, MutationKind, MutationState};
