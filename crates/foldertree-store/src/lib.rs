//! # foldertree-store
//!
//! Folder store implementations for the FolderTree engine.
//!
//! - [`memory`]: in-process store keyed by folder id, persisted as a JSON
//!   snapshot, with simulated latency and fault injection.

pub mod fault;
pub mod memory;
pub mod snapshot;

pub use fault::StoreOperation;
pub use memory::MemoryFolderStore;
pub use snapshot::Snapshot;
