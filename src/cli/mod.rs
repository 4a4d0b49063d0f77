use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod display;
pub mod export;
pub mod folders;
pub mod import;
pub mod ui;

pub use display::print_contact;
pub use export::run_export;
pub use folders::{run_duplicates, run_folders};
pub use import::{run_import, run_restore};

#[derive(Parser)]
#[command(name = "contactmerge")]
#[command(about = "Merge contact exports into a folder-organised address book")]
#[command(version)]
pub struct Cli {
    /// Config file (default: <config dir>/contactmerge/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Address book database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,
    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import contacts from a CSV, vCard or backup file
    Import(ImportArgs),
    /// Restore a backup, putting contacts back in their original folders
    Restore(RestoreArgs),
    /// Write every contact to a backup file
    Export(ExportArgs),
    /// List folders with contact counts
    Folders,
    /// Show email addresses already shared by several contacts
    Duplicates,
}

#[derive(Args)]
pub struct ImportArgs {
    pub file: String,
    /// Input format: "csv", "vcard" or "backup" (default: from extension)
    #[arg(short, long)]
    pub format: Option<String>,
    /// Duplicate handling: "skip", "overwrite" or "merge"
    #[arg(short, long)]
    pub strategy: Option<String>,
    /// Decide each duplicate interactively
    #[arg(short, long)]
    pub interactive: bool,
    /// Put everything in this folder and only check it for duplicates
    #[arg(long, value_name = "NAME")]
    pub folder: Option<String>,
    #[arg(short, long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct RestoreArgs {
    pub file: String,
    /// Duplicate handling: "skip", "overwrite" or "merge"
    #[arg(short, long)]
    pub strategy: Option<String>,
    #[arg(short, long)]
    pub interactive: bool,
    #[arg(short, long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    pub file: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import_command() {
        let cli = Cli::parse_from([
            "contactmerge",
            "--db",
            "/tmp/x.db",
            "import",
            "people.csv",
            "--strategy",
            "merge",
            "--folder",
            "Vendors",
            "-d",
        ]);

        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        match cli.command {
            Commands::Import(args) => {
                assert_eq!(args.file, "people.csv");
                assert_eq!(args.strategy.as_deref(), Some("merge"));
                assert_eq!(args.folder.as_deref(), Some("Vendors"));
                assert!(args.dry_run);
                assert!(!args.interactive);
            }
            _ => panic!("expected import"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["contactmerge", "folders", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Folders));
    }
}
