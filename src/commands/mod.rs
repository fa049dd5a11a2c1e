//! CLI command definitions and dispatch.

pub mod check;
pub mod folder;
pub mod tree;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::debug;

use foldertree_core::config::AppConfig;
use foldertree_core::error::AppError;
use foldertree_core::types::OwnerId;
use foldertree_engine::MutationCoordinator;
use foldertree_store::{MemoryFolderStore, Snapshot};

use crate::output::OutputFormat;

/// FolderTree: manage a hierarchical folder tree stored as a JSON snapshot
#[derive(Debug, Parser)]
#[command(name = "foldertree", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the folder tree
    Tree(tree::TreeArgs),
    /// List every folder
    List,
    /// Create a folder
    Create(folder::CreateArgs),
    /// Rename a folder
    Rename(folder::RenameArgs),
    /// Move a folder under another folder or to the root level
    Move(folder::MoveArgs),
    /// Delete a folder and everything below it
    Delete(folder::DeleteArgs),
    /// Check the tree for dangling parents and cycles
    Check,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        let workspace = Workspace::open(config).await?;
        match &self.command {
            Commands::Tree(args) => tree::execute(args, &workspace, self.format).await,
            Commands::List => folder::list(&workspace, self.format).await,
            Commands::Create(args) => folder::create(args, &workspace, self.format).await,
            Commands::Rename(args) => folder::rename(args, &workspace, self.format).await,
            Commands::Move(args) => folder::move_to(args, &workspace, self.format).await,
            Commands::Delete(args) => folder::delete(args, &workspace, self.format).await,
            Commands::Check => check::execute(&workspace, self.format).await,
        }
    }
}

/// A snapshot-backed store with a coordinator loaded from it.
pub struct Workspace {
    /// Where the snapshot lives.
    pub snapshot_path: String,
    /// The store the snapshot was loaded into.
    pub store: MemoryFolderStore,
    /// Coordinator over the store.
    pub coordinator: MutationCoordinator,
}

impl Workspace {
    /// Load the snapshot named by `config` and build the folder graph.
    pub async fn open(config: &AppConfig) -> Result<Self, AppError> {
        let owner_id = OwnerId::from(config.store.owner_id.as_str());
        let snapshot = Snapshot::load(&config.store.snapshot_path, &owner_id).await?;
        let store = MemoryFolderStore::from_config(&config.store);
        store.load(snapshot.folders);

        let coordinator =
            MutationCoordinator::new(Arc::new(store.clone()), config.engine.clone());
        coordinator.refresh(&owner_id).await?;
        debug!(path = %config.store.snapshot_path, "Workspace opened");

        Ok(Self {
            snapshot_path: config.store.snapshot_path.clone(),
            store,
            coordinator,
        })
    }

    /// Write the store back to the snapshot file.
    pub async fn persist(&self) -> Result<(), AppError> {
        self.store.snapshot().save(&self.snapshot_path).await
    }
}
