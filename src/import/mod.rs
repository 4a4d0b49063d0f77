//! Input parsers
//!
//! Each parser turns one file into canonical `Contact` records. Parsing is
//! all-or-nothing: a malformed file is a setup error, while bad values in
//! otherwise readable records are left for validation to report.

pub mod backup;
pub mod csv;
pub mod vcard;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::Contact;

pub use backup::{export_backup, read_backup, write_backup, Backup, ExportSummary};
pub use self::csv::{parse_csv, parse_csv_reader, CsvField};
pub use vcard::{parse_vcard, parse_vcard_str};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    VCard,
    Backup,
}

impl InputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::VCard => "vcard",
            Self::Backup => "backup",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "vcard" | "vcf" => Some(Self::VCard),
            "backup" | "json" => Some(Self::Backup),
            _ => None,
        }
    }

    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "vcf" | "vcard" => Ok(Self::VCard),
            "json" => Ok(Self::Backup),
            "" => Err(Error::UnsupportedFormat(format!(
                "{} has no extension; pass --format",
                path.display()
            ))),
            other => Err(Error::UnsupportedFormat(format!(".{}", other))),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read every record from `path`.
///
/// `format` falls back to the file extension. `csv_columns` extends the
/// CSV header table and is ignored for other formats.
pub fn read_contacts(
    path: &Path,
    format: Option<InputFormat>,
    csv_columns: &HashMap<String, String>,
) -> Result<Vec<Contact>> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let format = match format {
        Some(format) => format,
        None => InputFormat::from_path(path)?,
    };

    let contacts = match format {
        InputFormat::Csv => parse_csv(path, csv_columns)?,
        InputFormat::VCard => parse_vcard(path)?,
        InputFormat::Backup => read_backup(path)?.contacts,
    };

    tracing::debug!(path = %path.display(), %format, records = contacts.len(), "parsed input");
    Ok(contacts)
}
