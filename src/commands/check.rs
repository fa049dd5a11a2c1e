//! The `check` command.

use foldertree_core::error::AppError;

use super::Workspace;
use crate::output::{self, OutputFormat};

/// Report dangling parents and cycles. Fails when any are found.
pub async fn execute(workspace: &Workspace, format: OutputFormat) -> Result<(), AppError> {
    let graph = workspace.coordinator.graph().await;
    let report = graph.integrity_report();

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            output::print_kv("Folders", &graph.len().to_string());
            output::print_kv("Dangling parents", &report.dangling.len().to_string());
            output::print_kv("Cyclic folders", &report.cyclic.len().to_string());
            output::print_kv("Folders leading into a cycle", &report.cycle_tails.len().to_string());
            for issue in report.issues() {
                output::print_warning(&issue.to_string());
            }
        }
    }

    if report.is_clean() {
        if format == OutputFormat::Table {
            output::print_success("Folder tree is consistent");
        }
        Ok(())
    } else {
        Err(AppError::integrity(format!(
            "{} integrity issue(s) found",
            report.issues().len()
        )))
    }
}
