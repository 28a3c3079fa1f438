//! Sync command implementation

use anyhow::{ensure, Context, Result};
use clap::Args;
use iconsync_db::IconSyncDb;
use iconsync_index::{
    BatchIndexer, CommandRasterizer, RepoSync, RetryPolicy, SearchIndexClient, SyncPipeline,
    VisionEmbedder, DEFAULT_BATCH_SIZE, DEFAULT_RAW_URL_BASE, DEFAULT_TIMEOUT,
};
use std::time::Duration;

use super::{print_outcome, RepoArgs, SEARCH_TARGET};

#[derive(Args)]
pub struct SyncArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Icons per embedding and upload batch
    #[arg(short = 'b', long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Wait before the single retry of a rate-limited embedding call
    #[arg(long, default_value = "1000")]
    pub retry_delay_ms: u64,

    /// Pause between batches
    #[arg(long, default_value = "0")]
    pub chunk_delay_ms: u64,

    /// Base URL the document `url` field is built from
    #[arg(long, default_value = DEFAULT_RAW_URL_BASE)]
    pub raw_url_base: String,

    /// Image embedding service endpoint
    #[arg(long, env = "AZURE_VISION_ENDPOINT")]
    pub vision_endpoint: String,

    /// Image embedding service key
    #[arg(long, env = "AZURE_VISION_KEY", hide_env_values = true)]
    pub vision_key: String,

    /// Search service endpoint
    #[arg(long, env = "AZURE_SEARCH_ENDPOINT")]
    pub search_endpoint: String,

    /// Search service admin key
    #[arg(long, env = "AZURE_SEARCH_KEY", hide_env_values = true)]
    pub search_key: String,

    /// Name of the search index receiving the documents
    #[arg(long, env = "AZURE_SEARCH_INDEX_NAME")]
    pub search_index: String,
}

/// Indexes icons changed since the last run into the search index
pub fn cmd_sync(args: SyncArgs, db: IconSyncDb) -> Result<()> {
    ensure!(args.batch_size > 0, "--batch-size must be at least 1");

    log::info!("Syncing {} into index {}", args.repo.repo_url, args.search_index);
    log::info!("Batch size: {} icons", args.batch_size);

    let repo = args.repo.git_sync();
    let rasterizer = CommandRasterizer::new(args.repo.rasterizer.as_str());
    let embedder = VisionEmbedder::new(&args.vision_endpoint, &args.vision_key, DEFAULT_TIMEOUT);
    let store = SearchIndexClient::new(
        &args.search_endpoint,
        &args.search_key,
        &args.search_index,
        DEFAULT_TIMEOUT,
    );

    let indexer = BatchIndexer::new(repo.workdir(), &rasterizer, &embedder, &store)
        .with_retry(RetryPolicy::new(Duration::from_millis(args.retry_delay_ms)))
        .with_url_base(args.raw_url_base.as_str())
        .with_chunk_delay(Duration::from_millis(args.chunk_delay_ms));

    let batch_size = args.batch_size;
    let outcome = SyncPipeline::new(&repo, &db, SEARCH_TARGET)
        .with_state_commit(args.repo.state_commit())
        .run(|paths| indexer.run(paths, batch_size))
        .context("Sync run failed")?;

    print_outcome(&outcome);
    Ok(())
}
