use std::path::Path;

use anyhow::{bail, Context, Result};

use super::ui::{warning, InquirePrompter};
use super::{ImportArgs, RestoreArgs};
use crate::config::Config;
use crate::db::Database;
use crate::engine::orchestrator::{ImportOptions, ImportReport, Importer, RecordErrorKind};
use crate::engine::resolve::MergeStrategy;
use crate::import::{read_backup, read_contacts, InputFormat};
use crate::models::Contact;

/// Execute the import command.
pub fn run_import(db: &Database, config: &Config, args: &ImportArgs) -> Result<()> {
    let format = match args.format.as_deref() {
        Some(f) => match InputFormat::parse(f) {
            Some(format) => Some(format),
            None => bail!("Unknown format '{}' (expected csv, vcard or backup)", f),
        },
        None => None,
    };

    let path = Path::new(&args.file);
    let contacts = read_contacts(path, format, &config.csv_columns)
        .with_context(|| format!("Failed to read {}", args.file))?;

    let mut options = options_from(config, args.strategy.as_deref(), args.interactive, args.dry_run)?;
    options.target_folder = args.folder.clone().filter(|f| !f.trim().is_empty());

    announce(&args.file, contacts.len(), &options);
    let report = run_batch(db, options, contacts)?;
    print_summary(&report);
    Ok(())
}

/// Execute the restore command.
pub fn run_restore(db: &Database, config: &Config, args: &RestoreArgs) -> Result<()> {
    let backup = read_backup(Path::new(&args.file))
        .with_context(|| format!("Failed to read backup {}", args.file))?;

    let mut options = options_from(config, args.strategy.as_deref(), args.interactive, args.dry_run)?;
    options.use_source_folders = true;

    println!(
        "Backup from {}",
        backup.exported_at.format("%Y-%m-%d %H:%M UTC")
    );
    announce(&args.file, backup.contacts.len(), &options);
    let report = run_batch(db, options, backup.contacts)?;
    print_summary(&report);
    Ok(())
}

/// Config values with command-line flags applied on top
fn options_from(
    config: &Config,
    strategy: Option<&str>,
    interactive: bool,
    dry_run: bool,
) -> Result<ImportOptions> {
    let strategy = match strategy {
        Some(s) => match MergeStrategy::parse(s) {
            Some(strategy) => strategy,
            None => bail!("Unknown strategy '{}' (expected skip, overwrite or merge)", s),
        },
        None => config.strategy,
    };

    Ok(ImportOptions {
        strategy,
        interactive: interactive || config.interactive,
        dry_run,
        rules: config.folder_rules(),
        target_folder: None,
        use_source_folders: false,
    })
}

fn announce(file: &str, count: usize, options: &ImportOptions) {
    let verb = if options.dry_run { "Dry run" } else { "Importing" };
    eprintln!(
        "{}: {} ({} records, duplicates: {}{})",
        verb,
        file,
        count,
        options.strategy,
        if options.interactive { ", interactive" } else { "" }
    );
}

fn run_batch(db: &Database, options: ImportOptions, contacts: Vec<Contact>) -> Result<ImportReport> {
    let report = if options.interactive {
        let mut prompter = InquirePrompter::new();
        Importer::new(db, options)
            .with_prompter(&mut prompter)
            .run(contacts)?
    } else {
        Importer::new(db, options).run(contacts)?
    };
    Ok(report)
}

/// Summary lines for a finished batch
pub fn summary_lines(report: &ImportReport) -> Vec<String> {
    let mut lines = Vec::new();
    let verb = if report.dry_run { "Would create" } else { "Created" };

    lines.push(format!("{} {} of {} contacts", verb, report.success_count, report.total));
    if !report.created_per_folder.is_empty() {
        let folders: Vec<String> = report
            .created_per_folder
            .iter()
            .map(|(name, count)| format!("{} {}", name, count))
            .collect();
        lines.push(format!("  in {}", folders.join(", ")));
    }

    if report.updated_count > 0 {
        let verb = if report.dry_run { "Would update" } else { "Updated" };
        lines.push(format!("{} {} existing contacts", verb, report.updated_count));
    }
    if report.skipped_count > 0 {
        lines.push(format!("Skipped {} duplicates", report.skipped_count));
    }
    if report.invalid_count > 0 {
        lines.push(format!("Invalid: {}", report.invalid_count));
    }
    if report.failure_count > 0 {
        lines.push(format!("Errors: {}", report.failure_count));
    }

    for error in &report.errors {
        let tag = match error.kind {
            RecordErrorKind::Validation => "invalid",
            RecordErrorKind::Resolution => "unresolved",
            RecordErrorKind::Persistence => "failed",
        };
        lines.push(format!("  #{} {} ({}): {}", error.index, error.label, tag, error.message));
    }

    lines
}

fn print_summary(report: &ImportReport) {
    println!();
    for line in summary_lines(report) {
        println!("{}", line);
    }
    if !report.failed_folders.is_empty() {
        warning(&format!(
            "could not read folder(s) {}; duplicates there were not detected",
            report.failed_folders.join(", ")
        ));
    }
}
