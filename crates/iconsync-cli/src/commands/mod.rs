//! Command implementations

mod stats;
mod sync;
mod train;

pub use stats::cmd_stats;
pub use sync::{cmd_sync, SyncArgs};
pub use train::{cmd_train, TrainArgs};

use clap::Args;
use colored::Colorize;
use iconsync_index::{GitRepoSync, RunOutcome, StateCommit, DEFAULT_REPO_URL};
use std::path::PathBuf;

/// Sync target names used as keys of the stored state
pub const SEARCH_TARGET: &str = "search";
pub const TRAINING_TARGET: &str = "training";

/// Options shared by every command that syncs the upstream repository
#[derive(Args)]
pub struct RepoArgs {
    /// Upstream icon repository URL
    #[arg(long, default_value = DEFAULT_REPO_URL)]
    pub repo_url: String,

    /// Working copy location, wiped and re-cloned on every run
    #[arg(long, default_value = "./iconsync-repo")]
    pub workdir: PathBuf,

    /// Clone depth (0 for full history)
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(i32).range(0..))]
    pub depth: i32,

    /// Program used to rasterize SVGs to PNG
    #[arg(long, default_value = "rsvg-convert")]
    pub rasterizer: String,

    /// Store the new revision only after the upload succeeded
    #[arg(long)]
    pub commit_after_index: bool,
}

impl RepoArgs {
    pub fn git_sync(&self) -> GitRepoSync {
        let depth = (self.depth > 0).then_some(self.depth);
        GitRepoSync::new(self.repo_url.as_str(), self.workdir.clone()).with_depth(depth)
    }

    pub fn state_commit(&self) -> StateCommit {
        if self.commit_after_index {
            StateCommit::AfterIndexing
        } else {
            StateCommit::BeforeIndexing
        }
    }
}

/// Prints the end-of-run summary
pub fn print_outcome(outcome: &RunOutcome) {
    println!("{}", "Sync Summary:".bright_cyan().bold());
    let from = outcome
        .old_revision
        .as_ref()
        .map(|r| r.short().to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  {}: {} → {}",
        "Revision".bright_yellow(),
        from,
        outcome.new_revision.short().bold()
    );
    println!("  {}: {}", "Changes".bright_yellow(), outcome.changes.len().to_string().bold());
    println!(
        "  {}: {}",
        "Stale documents".bright_yellow(),
        outcome.partition.deletes.len().to_string().bold()
    );

    match &outcome.stats {
        Some(stats) => {
            println!("  {}: {}", "Uploaded".bright_yellow(), stats.indexed.to_string().green());
            if stats.failed > 0 {
                println!("  {}: {}", "Failed".bright_yellow(), stats.failed.to_string().red());
            }
        }
        None => println!("  {}", "Nothing to upload".dimmed()),
    }
}
