//! JSON backup format used by `export` and `restore`

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::index::{build_index, FolderCount};
use crate::error::{Error, Result};
use crate::models::Contact;
use crate::store::ContactStore;

/// Every contact in the store at `exported_at`, each tagged with the folder
/// it came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backup {
    pub exported_at: DateTime<Utc>,
    pub contacts: Vec<Contact>,
}

impl Backup {
    pub fn new(contacts: Vec<Contact>) -> Self {
        Self {
            exported_at: Utc::now(),
            contacts,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub count: usize,
    pub folder_counts: Vec<FolderCount>,
    /// Folders that could not be read and are missing from the backup
    pub failed_folders: Vec<String>,
}

pub fn read_backup(path: &Path) -> Result<Backup> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|e| Error::Backup(e.to_string()))
}

pub fn write_backup(path: &Path, backup: &Backup) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, backup)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Snapshot every folder of `store` into a backup file
pub fn export_backup(store: &dyn ContactStore, path: &Path) -> Result<ExportSummary> {
    let index = build_index(store)?;
    for folder in &index.failed_folders {
        warn!(folder = %folder, "folder left out of backup");
    }

    let summary = ExportSummary {
        count: index.contacts.len(),
        folder_counts: index.folder_counts.clone(),
        failed_folders: index.failed_folders.clone(),
    };

    write_backup(path, &Backup::new(index.contacts))?;
    info!(path = %path.display(), contacts = summary.count, "backup written");
    Ok(summary)
}
