use std::path::Path;

use anyhow::{Context, Result};

use super::ui::warning;
use crate::db::Database;
use crate::import::export_backup;

/// Execute the export command.
pub fn run_export(db: &Database, file: &str) -> Result<()> {
    let summary = export_backup(db, Path::new(file))
        .with_context(|| format!("Failed to export to {}", file))?;

    println!("Exported {} contacts to {}", summary.count, file);
    for folder in summary.folder_counts.iter().filter(|f| !f.failed) {
        println!("  {} {}", folder.name, folder.count);
    }
    if !summary.failed_folders.is_empty() {
        warning(&format!(
            "not included (unreadable): {}",
            summary.failed_folders.join(", ")
        ));
    }
    Ok(())
}
