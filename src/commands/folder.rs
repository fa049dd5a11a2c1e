//! Folder listing and mutation commands.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use foldertree_core::error::AppError;
use foldertree_core::types::FolderId;
use foldertree_engine::MutationRecord;

use super::Workspace;
use crate::output::{self, OutputFormat};

/// Arguments for `create`
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Folder name
    #[arg(short, long)]
    pub name: String,
    /// Parent folder ID (omit for root)
    #[arg(short, long)]
    pub parent: Option<String>,
}

/// Arguments for `rename`
#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Folder ID
    #[arg(short, long)]
    pub id: String,
    /// New name
    #[arg(short, long)]
    pub name: String,
}

/// Arguments for `move`
#[derive(Debug, Args)]
pub struct MoveArgs {
    /// Folder ID
    #[arg(short, long)]
    pub id: String,
    /// New parent folder ID (omit to move to the root level)
    #[arg(short, long)]
    pub parent: Option<String>,
}

/// Arguments for `delete`
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Folder ID
    #[arg(short, long)]
    pub id: String,
}

/// Folder display row
#[derive(Debug, Serialize, Tabled)]
struct FolderRow {
    /// Folder ID
    id: String,
    /// Name
    name: String,
    /// Parent folder ID
    parent: String,
    /// Filed items
    items: u64,
}

/// Print every folder
pub async fn list(workspace: &Workspace, format: OutputFormat) -> Result<(), AppError> {
    let graph = workspace.coordinator.graph().await;
    let rows: Vec<FolderRow> = graph
        .all()
        .into_iter()
        .map(|f| FolderRow {
            id: f.id.to_string(),
            name: f.name.clone(),
            parent: f
                .parent_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".to_string()),
            items: f.item_count,
        })
        .collect();
    output::print_list(&rows, format);
    Ok(())
}

/// Create a folder
pub async fn create(
    args: &CreateArgs,
    workspace: &Workspace,
    format: OutputFormat,
) -> Result<(), AppError> {
    let parent = args.parent.as_deref().map(FolderId::from);
    let record = workspace
        .coordinator
        .create_folder(&args.name, parent.as_ref())
        .await?;
    finish(workspace, &record, format, &format!("Created folder {}", record.folder_id)).await
}

/// Rename a folder
pub async fn rename(
    args: &RenameArgs,
    workspace: &Workspace,
    format: OutputFormat,
) -> Result<(), AppError> {
    let id = FolderId::from(args.id.as_str());
    let record = workspace.coordinator.rename_folder(&id, &args.name).await?;
    finish(workspace, &record, format, &format!("Renamed folder {id}")).await
}

/// Move a folder
pub async fn move_to(
    args: &MoveArgs,
    workspace: &Workspace,
    format: OutputFormat,
) -> Result<(), AppError> {
    let id = FolderId::from(args.id.as_str());
    let parent = args.parent.as_deref().map(FolderId::from);
    let record = workspace
        .coordinator
        .move_folder(&id, parent.as_ref())
        .await?;
    let target = parent
        .as_ref()
        .map(|p| format!("folder {p}"))
        .unwrap_or_else(|| "the root level".to_string());
    finish(workspace, &record, format, &format!("Moved folder {id} to {target}")).await
}

/// Delete a folder and its subtree
pub async fn delete(
    args: &DeleteArgs,
    workspace: &Workspace,
    format: OutputFormat,
) -> Result<(), AppError> {
    let id = FolderId::from(args.id.as_str());
    let (folders, items) = {
        let graph = workspace.coordinator.graph().await;
        let subtree = graph.ancestry().descendants(&id);
        let items: u64 = subtree
            .iter()
            .chain(std::iter::once(&id))
            .filter_map(|f| graph.get(f))
            .map(|f| f.item_count)
            .sum();
        (subtree.len() + 1, items)
    };
    let record = workspace.coordinator.delete_folder(&id).await?;
    finish(
        workspace,
        &record,
        format,
        &format!("Deleted folder {id} ({folders} folders, {items} items)"),
    )
    .await
}

/// Persist a committed change and report it.
async fn finish(
    workspace: &Workspace,
    record: &MutationRecord,
    format: OutputFormat,
    message: &str,
) -> Result<(), AppError> {
    if record.remote_dispatched {
        workspace.persist().await?;
    }
    match format {
        OutputFormat::Json => output::print_json(record),
        OutputFormat::Table if record.remote_dispatched => output::print_success(message),
        OutputFormat::Table => output::print_warning("Nothing changed"),
    }
    Ok(())
}
