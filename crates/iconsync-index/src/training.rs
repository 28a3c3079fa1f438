//! Upload of tagged icon images to the Custom Vision training service

use data_encoding::BASE64;
use iconsync_core::IconAsset;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{IconError, ServiceError, UploadError};
use crate::formatting::format_number;
use crate::raster::Rasterizer;
use crate::stats::IndexStats;

/// Images per `images/files` call; the service rejects larger batches
pub const TRAINING_BATCH_SIZE: usize = 50;

const API_VERSION: &str = "v3.3";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

/// One tagged image ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingImage {
    pub name: String,
    pub contents: Vec<u8>,
    pub tag_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUploadResult {
    pub is_batch_successful: bool,
    #[serde(default)]
    pub images: Vec<ImageUploadResult>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadResult {
    pub status: String,
    pub source_url: Option<String>,
    pub image: Option<CreatedImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedImage {
    pub id: Option<String>,
}

impl ImageUploadResult {
    /// `OK` and `OKDuplicate` both leave the image in the project
    pub fn is_ok(&self) -> bool {
        self.status == "OK" || self.status == "OKDuplicate"
    }
}

/// Tag operations and image upload of a training project
pub trait TrainingService {
    fn list_tags(&self) -> Result<Vec<Tag>, ServiceError>;
    fn create_tag(&self, name: &str) -> Result<Tag, ServiceError>;
    fn create_images(&self, images: &[TrainingImage]) -> Result<BatchUploadResult, ServiceError>;
}

/// Tag name → tag id, owned by the caller so runs and tests stay independent
#[derive(Debug, Clone, Default)]
pub struct TagCache {
    tags: HashMap<String, String>,
}

impl TagCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cache holding every tag the project already has
    pub fn load(service: &dyn TrainingService) -> Result<Self, ServiceError> {
        log::info!("Fetching existing tags...");
        let mut cache = Self::new();
        for tag in service.list_tags()? {
            cache.tags.insert(tag.name, tag.id);
        }
        log::info!("Initialized tag cache with {} tags", cache.len());
        Ok(cache)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Returns the id for `name`, creating the tag on a miss.
    /// Sleeps `pause` after each creation.
    pub fn get_or_create(
        &mut self,
        service: &dyn TrainingService,
        name: &str,
        pause: Duration,
    ) -> Result<String, ServiceError> {
        if let Some(id) = self.tags.get(name) {
            return Ok(id.clone());
        }

        let tag = service.create_tag(name)?;
        log::debug!("Created tag {} ({})", name, tag.id);
        self.tags.insert(name.to_string(), tag.id.clone());

        if !pause.is_zero() {
            std::thread::sleep(pause);
        }
        Ok(tag.id)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageFileEntry<'a> {
    name: &'a str,
    contents: String,
    tag_ids: &'a [String],
}

#[derive(Serialize)]
struct ImageFileBatch<'a> {
    images: Vec<ImageFileEntry<'a>>,
}

fn image_file_batch(images: &[TrainingImage]) -> ImageFileBatch<'_> {
    ImageFileBatch {
        images: images
            .iter()
            .map(|image| ImageFileEntry {
                name: &image.name,
                contents: BASE64.encode(&image.contents),
                tag_ids: &image.tag_ids,
            })
            .collect(),
    }
}

/// Client for the Custom Vision training REST API of one project
pub struct CustomVisionClient {
    agent: ureq::Agent,
    base_url: String,
    key: String,
}

impl CustomVisionClient {
    pub fn new(endpoint: &str, key: &str, project_id: &str, timeout: Duration) -> Self {
        Self {
            agent: crate::http::agent(timeout),
            base_url: format!(
                "{}/customvision/{}/training/projects/{}",
                endpoint.trim_end_matches('/'),
                API_VERSION,
                project_id
            ),
            key: key.to_string(),
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(response: ureq::Response) -> Result<T, ServiceError> {
    response
        .into_json()
        .map_err(|e| ServiceError::Decode(e.to_string()))
}

impl TrainingService for CustomVisionClient {
    fn list_tags(&self) -> Result<Vec<Tag>, ServiceError> {
        let response = self
            .agent
            .get(&format!("{}/tags", self.base_url))
            .set("Training-key", &self.key)
            .call()?;
        decode(response)
    }

    fn create_tag(&self, name: &str) -> Result<Tag, ServiceError> {
        let response = self
            .agent
            .post(&format!("{}/tags", self.base_url))
            .set("Training-key", &self.key)
            .query("name", name)
            .call()?;
        decode(response)
    }

    fn create_images(&self, images: &[TrainingImage]) -> Result<BatchUploadResult, ServiceError> {
        let response = self
            .agent
            .post(&format!("{}/images/files", self.base_url))
            .set("Training-key", &self.key)
            .send_json(image_file_batch(images))?;
        decode(response)
    }
}

/// Uploads icons as tagged training images, 50 per call.
///
/// Tags are named `<icon name>-<variant>`.
pub struct TrainingUploader<'a> {
    workdir: PathBuf,
    rasterizer: &'a dyn Rasterizer,
    service: &'a dyn TrainingService,
    batch_size: usize,
    chunk_delay: Duration,
    tag_delay: Duration,
}

impl<'a> TrainingUploader<'a> {
    pub fn new(
        workdir: impl AsRef<Path>,
        rasterizer: &'a dyn Rasterizer,
        service: &'a dyn TrainingService,
    ) -> Self {
        Self {
            workdir: workdir.as_ref().to_path_buf(),
            rasterizer,
            service,
            batch_size: TRAINING_BATCH_SIZE,
            chunk_delay: Duration::from_secs(1),
            tag_delay: Duration::from_millis(500),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Overrides the pauses after each batch and after each tag creation
    pub fn with_delays(mut self, chunk_delay: Duration, tag_delay: Duration) -> Self {
        self.chunk_delay = chunk_delay;
        self.tag_delay = tag_delay;
        self
    }

    pub fn run(&self, paths: &[String], tags: &mut TagCache) -> Result<IndexStats, UploadError> {
        let start_time = Instant::now();
        let mut stats = IndexStats::default();

        log::info!("📂 Uploading {} icons for training", format_number(paths.len()));

        for chunk in paths.chunks(self.batch_size) {
            stats.chunks += 1;

            let mut images = Vec::with_capacity(chunk.len());
            for path in chunk {
                match self.build_image(path, tags) {
                    Ok(image) => images.push(image),
                    Err(e) => {
                        log::warn!("❌ Error processing {}: {}", path, e);
                        stats.failed += 1;
                    }
                }
            }

            if images.is_empty() {
                log::warn!("Batch #{} produced no images, skipping upload", stats.chunks);
                continue;
            }

            let result = self
                .service
                .create_images(&images)
                .map_err(|source| UploadError::Batch {
                    items: images.len(),
                    source,
                })?;
            stats.uploads += 1;
            stats.indexed += images.len();
            report_batch(&result, images.len());

            if !self.chunk_delay.is_zero() {
                std::thread::sleep(self.chunk_delay);
            }
        }

        stats.elapsed_time = start_time.elapsed();
        Ok(stats)
    }

    fn build_image(&self, path: &str, tags: &mut TagCache) -> Result<TrainingImage, IconError> {
        let asset = IconAsset::from_path(path)?;

        let full_path = self.workdir.join(path);
        let svg = std::fs::read(&full_path).map_err(|source| IconError::Read {
            path: full_path,
            source,
        })?;
        let png = self.rasterizer.rasterize(&svg)?;

        let tag_name = asset.tag_name();
        let tag_id = tags
            .get_or_create(self.service, &tag_name, self.tag_delay)
            .map_err(IconError::Tag)?;

        Ok(TrainingImage {
            name: tag_name,
            contents: png,
            tag_ids: vec![tag_id],
        })
    }
}

fn report_batch(result: &BatchUploadResult, count: usize) {
    if result.is_batch_successful {
        log::info!("Successfully uploaded {} icons in this batch", count);
        return;
    }

    let failed: Vec<&ImageUploadResult> = result.images.iter().filter(|i| !i.is_ok()).collect();
    if failed.is_empty() {
        log::info!("Uploaded {} icons in this batch, some are duplicates", count);
        return;
    }

    log::error!("{} images in the batch failed", failed.len());
    for image in failed {
        log::error!(
            "  {} (image {})",
            image.status,
            image
                .image
                .as_ref()
                .and_then(|i| i.id.as_deref())
                .unwrap_or("-")
        );
    }
}
