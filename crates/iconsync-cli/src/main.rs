//! Iconsync CLI - Keeps icon search and training services in sync with an
//! upstream icon repository
//!
//! Provides:
//! - Incremental indexing of changed icons into the vector search index
//! - Incremental upload of changed icons to the training project
//! - Sync state and run history inspection

mod commands;
mod helpers;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use iconsync_db::IconSyncDb;
use std::path::PathBuf;

use commands::{cmd_stats, cmd_sync, cmd_train, SyncArgs, TrainArgs};

#[derive(Parser)]
#[command(name = "iconsync")]
#[command(about = "Incremental sync of an icon repository into search and training services", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the database holding sync state and run history
    #[arg(short, long, default_value = "./iconsync.db")]
    database: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Indexes icons changed since the last run into the search index
    Sync(SyncArgs),

    /// Uploads icons changed since the last run to the training project
    Train(TrainArgs),

    /// Shows stored revisions and recent runs
    Stats {
        /// Number of recent runs to display
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&cli.log_level),
    )
    .init();

    let db = IconSyncDb::open(&cli.database)
        .with_context(|| format!("Failed to open database at {:?}", cli.database))?;

    match cli.command {
        Commands::Sync(args) => cmd_sync(args, db)?,
        Commands::Train(args) => cmd_train(args, db)?,
        Commands::Stats { limit } => cmd_stats(limit, db)?,
    }

    Ok(())
}
