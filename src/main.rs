//! Command-line entrypoint: runs one retention sweep and exits.
//!
//! Periodicity belongs to the invoking scheduler (cron, systemd timer);
//! a non-zero exit signals a failed run.

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use mailsweep::{
    config::SweepConfig,
    db::{MessageLogRepo, PostgresMessageLog},
    observability,
    storage::create_object_store,
    sweep::{ArchiveSweep, SweepError},
};

#[derive(Parser, Debug)]
#[command(name = "mailsweep", version, about = "Archive-then-delete retention sweep for mail logs")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "mailsweep.toml")]
    config: PathBuf,

    /// Report what would be archived and deleted without uploading or
    /// deleting anything.
    #[arg(long)]
    dry_run: bool,

    /// Override the configured retention period in days.
    #[arg(long)]
    retention_days: Option<u32>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut config = match SweepConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("mailsweep: {e}");
            std::process::exit(1);
        }
    };
    if args.dry_run {
        config.sweep.dry_run = true;
    }
    if let Some(days) = args.retention_days {
        config.sweep.retention_days = days;
    }

    observability::init_tracing(&config.logging);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Retention sweep failed");
        std::process::exit(1);
    }
}

async fn run(config: SweepConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        retention_days = config.sweep.retention_days,
        file_record_budget = config.sweep.file_record_budget,
        dry_run = config.sweep.dry_run,
        "Starting mailsweep"
    );

    let repo = PostgresMessageLog::connect(&config.database)
        .await
        .map_err(SweepError::Connect)?;
    repo.ping().await.map_err(SweepError::Connect)?;
    tracing::info!("Database connection established");

    let store = create_object_store(&config.storage).await?;
    tracing::info!(backend = store.backend_name(), "Archive storage initialized");

    let sweep = ArchiveSweep::new(Arc::new(repo), store, config.sweep);
    let report = sweep.run().await?;

    println!("{}", report.summary());
    Ok(())
}
