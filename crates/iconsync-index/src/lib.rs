//! Iconsync Index - Incremental sync of an icon repository into a vector index
//!
//! This crate is responsible for:
//! - Maintaining a fresh working copy of the upstream icon repository
//! - Classifying icon changes since the last processed revision
//! - Rasterizing and embedding changed icons, with a bounded retry on rate limits
//! - Uploading index documents in batches, isolating per-icon failures
//! - Uploading tagged icons to a training service

mod diff;
mod embed;
mod error;
mod formatting;
mod http;
mod indexer;
mod normalize;
mod pipeline;
mod raster;
mod repo;
mod retry;
mod stats;
mod store;
mod training;

pub use diff::DiffClassifier;
pub use embed::{Embedder, VisionEmbedder};
pub use error::{IconError, PipelineError, RasterizeError, ServiceError, SyncError, UploadError};
pub use http::DEFAULT_TIMEOUT;
pub use indexer::{BatchIndexer, DEFAULT_BATCH_SIZE, DEFAULT_RAW_URL_BASE};
pub use normalize::{partition, Partition};
pub use pipeline::{RunOutcome, StateCommit, SyncPipeline};
pub use raster::{CommandRasterizer, Rasterizer};
pub use repo::{GitRepoSync, RepoSync, DEFAULT_REPO_URL};
pub use retry::{RetryPolicy, DEFAULT_RETRY_DELAY};
pub use stats::IndexStats;
pub use store::{DocumentStore, SearchIndexClient};
pub use training::{
    BatchUploadResult, CustomVisionClient, ImageUploadResult, Tag, TagCache, TrainingImage,
    TrainingService, TrainingUploader, TRAINING_BATCH_SIZE,
};
