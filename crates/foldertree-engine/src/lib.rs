//! # foldertree-engine
//!
//! The hierarchical folder tree engine. Reads flow from [`FolderGraph`]
//! through the [`AncestryResolver`] and [`ViewProjector`] to rendering;
//! writes go through the [`MutationCoordinator`], which applies them
//! optimistically, dispatches them to a [`RemoteFolderStore`], and rolls
//! them back when the store rejects them.

pub mod ancestry;
pub mod coordinator;
pub mod drag;
pub mod expansion;
pub mod graph;
pub mod notifier;
pub mod projector;
pub mod store;
pub mod validator;

pub use ancestry::{AncestryResolver, IntegrityError};
pub use coordinator::{MutationCoordinator, MutationRecord};
pub use drag::{DragSession, DragState, DropOutcome, DropTarget, MoveIntent};
pub use expansion::ExpansionState;
pub use graph::{FolderGraph, IntegrityReport};
pub use notifier::EventNotifier;
pub use projector::{ProjectionMode, ViewProjector};
pub use store::RemoteFolderStore;
pub use validator::{MoveError, MoveValidator, validate_folder_name};
