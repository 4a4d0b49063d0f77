use anyhow::Context;
use clap::Parser;
use contactmerge::cli::{run_duplicates, run_export, run_folders, run_import, run_restore, Cli, Commands};
use contactmerge::config::Config;
use contactmerge::db::Database;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let db = match cli.db.clone().or_else(|| config.database.clone()) {
        Some(path) => Database::open_at(path.clone())
            .with_context(|| format!("Failed to open database {}", path.display()))?,
        None => Database::open().context("Failed to open database")?,
    };

    match cli.command {
        Commands::Import(args) => run_import(&db, &config, &args)?,
        Commands::Restore(args) => run_restore(&db, &config, &args)?,
        Commands::Export(args) => run_export(&db, &args.file)?,
        Commands::Folders => run_folders(&db)?,
        Commands::Duplicates => run_duplicates(&db)?,
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "contactmerge=debug" } else { "contactmerge=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
