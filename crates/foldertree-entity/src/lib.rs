//! # foldertree-entity
//!
//! Domain models for FolderTree. `Folder` is the single persisted record
//! shape; the tree types are derived views built by the engine. All
//! entities derive `Debug`, `Clone`, `Serialize`, and `Deserialize`.

pub mod folder;
