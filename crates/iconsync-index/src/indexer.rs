//! Batched rasterize → embed → upsert loop

use iconsync_core::{IconAsset, IndexDocument};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::embed::Embedder;
use crate::error::{IconError, UploadError};
use crate::formatting::format_number;
use crate::raster::Rasterizer;
use crate::retry::RetryPolicy;
use crate::stats::IndexStats;
use crate::store::DocumentStore;

/// Base URL icons are served from in the index documents
pub const DEFAULT_RAW_URL_BASE: &str =
    "https://raw.githubusercontent.com/microsoft/fluentui-system-icons/main";

/// Default number of icons per upsert call
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Indexes icons from the working copy into a [`DocumentStore`].
///
/// Icons are handled one at a time and chunks one after another; the
/// embedding service is rate limited, so nothing here runs in parallel.
pub struct BatchIndexer<'a> {
    workdir: PathBuf,
    rasterizer: &'a dyn Rasterizer,
    embedder: &'a dyn Embedder,
    store: &'a dyn DocumentStore,
    retry: RetryPolicy,
    url_base: String,

    /// Pause after each chunk except the last
    chunk_delay: Duration,
}

impl<'a> BatchIndexer<'a> {
    pub fn new(
        workdir: impl AsRef<Path>,
        rasterizer: &'a dyn Rasterizer,
        embedder: &'a dyn Embedder,
        store: &'a dyn DocumentStore,
    ) -> Self {
        Self {
            workdir: workdir.as_ref().to_path_buf(),
            rasterizer,
            embedder,
            store,
            retry: RetryPolicy::default(),
            url_base: DEFAULT_RAW_URL_BASE.to_string(),
            chunk_delay: Duration::ZERO,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_url_base(mut self, url_base: impl Into<String>) -> Self {
        self.url_base = url_base.into();
        self
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// Indexes `paths` in consecutive chunks of at most `batch_size`.
    ///
    /// A failing icon is logged and left out of its chunk. A failing upload
    /// aborts the run; chunks uploaded before it stay in the store.
    /// A `batch_size` of zero is treated as one.
    pub fn run(&self, paths: &[String], batch_size: usize) -> Result<IndexStats, UploadError> {
        let start_time = Instant::now();
        let batch_size = batch_size.max(1);
        let total_chunks = paths.len().div_ceil(batch_size);
        let mut stats = IndexStats::default();

        log::info!(
            "📂 Processing {} icons in {} chunks of up to {}",
            format_number(paths.len()),
            total_chunks,
            batch_size
        );

        for (idx, chunk) in paths.chunks(batch_size).enumerate() {
            stats.chunks += 1;

            let mut documents = Vec::with_capacity(chunk.len());
            for path in chunk {
                match self.build_document(path) {
                    Ok(document) => {
                        log::debug!("✔ Indexed: {}", path);
                        documents.push(document);
                    }
                    Err(e) => {
                        log::warn!("❌ Error processing {}: {}", path, e);
                        stats.failed += 1;
                    }
                }
            }

            if documents.is_empty() {
                log::warn!("Chunk #{} produced no documents, skipping upload", idx + 1);
            } else {
                self.store.upsert(&documents)?;
                stats.uploads += 1;
                stats.indexed += documents.len();
            }

            log::info!(
                "⚡ Chunk {}/{} | Icons: {} indexed, {} failed",
                idx + 1,
                total_chunks,
                format_number(stats.indexed),
                format_number(stats.failed)
            );

            if !self.chunk_delay.is_zero() && idx + 1 < total_chunks {
                std::thread::sleep(self.chunk_delay);
            }
        }

        stats.elapsed_time = start_time.elapsed();
        Ok(stats)
    }

    /// Loads, rasterizes and embeds one icon
    pub fn build_document(&self, path: &str) -> Result<IndexDocument, IconError> {
        let asset = IconAsset::from_path(path)?;

        let full_path = self.workdir.join(path);
        let svg = std::fs::read(&full_path).map_err(|source| IconError::Read {
            path: full_path,
            source,
        })?;

        let raster = self.rasterizer.rasterize(&svg)?;
        let vector = self
            .retry
            .call(|| self.embedder.embed(&raster))
            .map_err(IconError::Embed)?;

        Ok(IndexDocument::new(&asset, &self.url_base, vector))
    }
}
