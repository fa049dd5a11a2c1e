//! The `tree` command.

use clap::Args;

use foldertree_core::error::AppError;
use foldertree_core::types::FolderId;
use foldertree_engine::{ExpansionState, ProjectionMode};

use super::Workspace;
use crate::output::{self, OutputFormat};

/// Arguments for `tree`
#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Show only folders matching this text, with their ancestors
    #[arg(short, long, conflicts_with = "scope")]
    pub search: Option<String>,
    /// Show only this folder with its ancestors, siblings and descendants
    #[arg(long)]
    pub scope: Option<String>,
    /// Expand this folder and its ancestors (repeatable)
    #[arg(short, long)]
    pub expand: Vec<String>,
    /// Expand every folder
    #[arg(short, long)]
    pub all: bool,
}

/// Print the projected tree
pub async fn execute(
    args: &TreeArgs,
    workspace: &Workspace,
    format: OutputFormat,
) -> Result<(), AppError> {
    let graph = workspace.coordinator.graph().await;

    let selection = args.scope.as_deref().map(FolderId::from);
    let mut expansion = ExpansionState::for_selection(&graph, selection.as_ref())?;
    let mode = match (&args.search, selection) {
        (Some(query), _) => {
            expansion.reveal_matches(&graph, query);
            ProjectionMode::Search(query.clone())
        }
        (None, Some(selected)) => ProjectionMode::Scoped(selected),
        (None, None) => ProjectionMode::Full,
    };
    for id in &args.expand {
        expansion.expand_path(&graph, &FolderId::from(id.as_str()))?;
    }
    if args.all {
        expansion.expand_all(&graph);
    }

    let tree = graph.projector().project(&mode, Some(&expansion))?;
    match format {
        OutputFormat::Json => output::print_json(&tree),
        OutputFormat::Table => output::print_outline(&tree.visible_rows()),
    }
    Ok(())
}
