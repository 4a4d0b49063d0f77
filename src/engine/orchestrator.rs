//! Import/restore pipeline
//!
//! validate → index → classify → resolve duplicates → place → persist.
//! Every duplicate group is decided before the first write, so a broken
//! prompt channel aborts with nothing persisted. Each create/update is a
//! separate store call; a failing call is recorded against its record and
//! the batch carries on.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::{info, warn};

use super::classify::{classify, DuplicateGroup};
use super::index::{build_folder_index, build_index, ContactIndex};
use super::placement::FolderRules;
use super::prompt::Prompter;
use super::resolve::{resolve_group, MergeStrategy, Outcome};
use super::validate::split_valid;
use crate::error::{Error, Result};
use crate::models::{is_default_folder_name, Contact, DEFAULT_FOLDER_NAME};
use crate::store::ContactStore;

/// How a batch is handled
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub strategy: MergeStrategy,
    /// Ask per duplicate instead of applying `strategy` blindly
    pub interactive: bool,
    /// Run everything but issue no store writes
    pub dry_run: bool,
    pub rules: FolderRules,
    /// Put every contact in this folder and only look for duplicates there
    pub target_folder: Option<String>,
    /// Prefer each record's recorded source folder (restoring a backup)
    pub use_source_folders: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordErrorKind {
    Validation,
    /// The duplicate group could not be decided (rejected merge answer)
    Resolution,
    Persistence,
}

impl fmt::Display for RecordErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => f.write_str("validation"),
            Self::Resolution => f.write_str("resolution"),
            Self::Persistence => f.write_str("persistence"),
        }
    }
}

/// A problem with one record. `index` is its 1-based position in the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    pub index: usize,
    pub label: String,
    pub kind: RecordErrorKind,
    pub message: String,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "record #{} ({}): {} error: {}",
            self.index, self.label, self.kind, self.message
        )
    }
}

/// Aggregate outcome of a batch
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub skipped_count: usize,
    pub updated_count: usize,
    pub invalid_count: usize,
    pub duplicate_count: usize,
    pub dry_run: bool,
    /// Contacts created per destination folder
    pub created_per_folder: BTreeMap<String, usize>,
    /// Folders left out of duplicate detection because listing them failed
    pub failed_folders: Vec<String>,
    pub errors: Vec<RecordError>,
}

impl ImportReport {
    fn record_error(&mut self, index: usize, contact: &Contact, kind: RecordErrorKind, message: String) {
        self.errors.push(RecordError {
            index,
            label: contact.label(),
            kind,
            message,
        });
    }
}

/// A parsed record with its position in the batch
#[derive(Debug, Clone)]
struct Numbered {
    index: usize,
    contact: Contact,
}

impl Borrow<Contact> for Numbered {
    fn borrow(&self) -> &Contact {
        &self.contact
    }
}

/// Decision for one duplicate group
enum Plan {
    Outcomes(Vec<Outcome>),
    Failed(String),
}

/// Runs batches against one store. Folder lookups are cached for the
/// lifetime of the importer only.
pub struct Importer<'a> {
    store: &'a dyn ContactStore,
    options: ImportOptions,
    prompter: Option<&'a mut dyn Prompter>,
    folder_ids: HashMap<String, Option<String>>,
}

impl<'a> Importer<'a> {
    pub fn new(store: &'a dyn ContactStore, options: ImportOptions) -> Self {
        Self {
            store,
            options,
            prompter: None,
            folder_ids: HashMap::new(),
        }
    }

    /// Attach the prompt sink used in interactive mode
    pub fn with_prompter(mut self, prompter: &'a mut dyn Prompter) -> Self {
        self.prompter = Some(prompter);
        self
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Process a parsed batch end to end
    pub fn run(&mut self, records: Vec<Contact>) -> Result<ImportReport> {
        if self.options.interactive && self.prompter.is_none() {
            return Err(Error::Prompt("interactive mode needs a prompter".into()));
        }

        let mut report = ImportReport {
            total: records.len(),
            dry_run: self.options.dry_run,
            ..ImportReport::default()
        };

        let (valid, invalid) = split_valid(records);
        for record in invalid {
            let message = record
                .issues
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            warn!(index = record.index, %message, "invalid record");
            report.invalid_count += 1;
            report.record_error(record.index, &record.contact, RecordErrorKind::Validation, message);
        }

        let index = self.existing_index()?;
        report.failed_folders = index.failed_folders.clone();

        let batch: Vec<Numbered> = valid
            .into_iter()
            .map(|(index, contact)| Numbered { index, contact })
            .collect();
        let classification = classify(&index.contacts, batch);
        report.duplicate_count = classification.duplicate_count;
        let groups = classification.duplicate_groups();

        let mut plans = Vec::with_capacity(groups.len());
        for group in &groups {
            plans.push((group, self.plan(group)?));
        }

        for item in &classification.unique_contacts {
            self.create(&mut report, item.index, &item.contact);
        }

        for (group, plan) in plans {
            self.apply(&mut report, group, plan);
        }

        report.errors.sort_by_key(|e| e.index);
        info!(
            total = report.total,
            created = report.success_count,
            updated = report.updated_count,
            skipped = report.skipped_count,
            failed = report.failure_count,
            invalid = report.invalid_count,
            dry_run = report.dry_run,
            "batch finished"
        );
        Ok(report)
    }

    fn existing_index(&mut self) -> Result<ContactIndex> {
        let target = match self.options.target_folder.clone() {
            Some(name) => name,
            None => return build_index(self.store),
        };

        if is_default_folder_name(&target) {
            return Ok(build_folder_index(self.store, None));
        }

        match self.store.find_folder(&target)? {
            Some(folder) => {
                self.folder_ids
                    .insert(folder.display_name.to_lowercase(), Some(folder.id.clone()));
                Ok(build_folder_index(self.store, Some(&folder)))
            }
            // Not created yet, so nothing in it can match
            None => Ok(ContactIndex::default()),
        }
    }

    /// Decide a group without writing anything. Only a failed prompt
    /// channel is returned as `Err`; anything else fails just this group.
    fn plan(&mut self, group: &DuplicateGroup<Numbered>) -> Result<Plan> {
        let prompter = self.prompter.as_deref_mut();
        match resolve_group(group, self.options.strategy, self.options.interactive, prompter) {
            Ok(outcomes) => Ok(Plan::Outcomes(outcomes)),
            Err(e @ Error::Prompt(_)) => Err(e),
            Err(e) => Ok(Plan::Failed(e.to_string())),
        }
    }

    fn apply(&mut self, report: &mut ImportReport, group: &DuplicateGroup<Numbered>, plan: Plan) {
        let outcomes = match plan {
            Plan::Outcomes(outcomes) => outcomes,
            Plan::Failed(message) => {
                for item in &group.incoming {
                    warn!(index = item.index, error = %message, "could not resolve duplicate");
                    report.failure_count += 1;
                    report.record_error(item.index, &item.contact, RecordErrorKind::Resolution, message.clone());
                }
                return;
            }
        };

        for (item, outcome) in group.incoming.iter().zip(outcomes) {
            match outcome {
                Outcome::Skip | Outcome::Unchanged => report.skipped_count += 1,
                Outcome::Create(contact) => self.create(report, item.index, &contact),
                Outcome::Update { id, contact } => self.update(report, item.index, &id, &contact),
            }
        }
    }

    /// Folder name a new contact goes to
    fn destination(&self, contact: &Contact) -> String {
        if let Some(target) = &self.options.target_folder {
            return target.clone();
        }
        if self.options.use_source_folders {
            if let Some(name) = contact.source_folder_name().filter(|n| !n.trim().is_empty()) {
                return name.to_string();
            }
        }
        self.options.rules.place(contact)
    }

    fn folder_id_for(&mut self, name: &str) -> Result<Option<String>> {
        if is_default_folder_name(name) {
            return Ok(None);
        }
        let cache_key = name.trim().to_lowercase();
        if let Some(id) = self.folder_ids.get(&cache_key) {
            return Ok(id.clone());
        }
        let folder = self.store.ensure_folder(name.trim())?;
        self.folder_ids.insert(cache_key, Some(folder.id.clone()));
        Ok(Some(folder.id))
    }

    fn create(&mut self, report: &mut ImportReport, index: usize, contact: &Contact) {
        let folder = self.destination(contact);
        let folder_label = if is_default_folder_name(&folder) {
            DEFAULT_FOLDER_NAME.to_string()
        } else {
            folder.trim().to_string()
        };

        if !self.options.dry_run {
            let result = self
                .folder_id_for(&folder)
                .and_then(|folder_id| self.store.create_contact(folder_id.as_deref(), &contact.without_metadata()));
            if let Err(e) = result {
                warn!(index, folder = %folder_label, error = %e, "create failed");
                report.failure_count += 1;
                report.record_error(index, contact, RecordErrorKind::Persistence, e.to_string());
                return;
            }
        }

        report.success_count += 1;
        *report.created_per_folder.entry(folder_label).or_default() += 1;
    }

    fn update(&mut self, report: &mut ImportReport, index: usize, id: &str, contact: &Contact) {
        if !self.options.dry_run {
            if let Err(e) = self.store.update_contact(id, contact) {
                warn!(index, id, error = %e, "update failed");
                report.failure_count += 1;
                report.record_error(index, contact, RecordErrorKind::Persistence, e.to_string());
                return;
            }
        }
        report.updated_count += 1;
    }
}
