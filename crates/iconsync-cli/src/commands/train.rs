//! Train command implementation

use anyhow::{Context, Result};
use clap::Args;
use iconsync_db::IconSyncDb;
use iconsync_index::{
    CommandRasterizer, CustomVisionClient, RepoSync, SyncPipeline, TagCache, TrainingUploader,
    UploadError, DEFAULT_TIMEOUT,
};

use super::{print_outcome, RepoArgs, TRAINING_TARGET};

#[derive(Args)]
pub struct TrainArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Training service endpoint
    #[arg(long, env = "CUSTOM_VISION_ENDPOINT")]
    pub training_endpoint: String,

    /// Training service key
    #[arg(long, env = "CUSTOM_VISION_TRAINING_KEY", hide_env_values = true)]
    pub training_key: String,

    /// Training project receiving the images
    #[arg(long, env = "CUSTOM_VISION_PROJECT_ID")]
    pub project_id: String,
}

/// Uploads icons changed since the last run as tagged training images
pub fn cmd_train(args: TrainArgs, db: IconSyncDb) -> Result<()> {
    log::info!("Syncing {} into training project {}", args.repo.repo_url, args.project_id);

    let repo = args.repo.git_sync();
    let rasterizer = CommandRasterizer::new(args.repo.rasterizer.as_str());
    let service = CustomVisionClient::new(
        &args.training_endpoint,
        &args.training_key,
        &args.project_id,
        DEFAULT_TIMEOUT,
    );
    let uploader = TrainingUploader::new(repo.workdir(), &rasterizer, &service);

    let outcome = SyncPipeline::new(&repo, &db, TRAINING_TARGET)
        .with_state_commit(args.repo.state_commit())
        .run(|paths| {
            let mut tags = TagCache::load(&service).map_err(UploadError::Tags)?;
            uploader.run(paths, &mut tags)
        })
        .context("Training run failed")?;

    print_outcome(&outcome);
    Ok(())
}
