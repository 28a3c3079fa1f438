//! Error types for the sync pipeline
//!
//! Only [`IconError`] is recovered from (the icon is dropped and the run
//! continues). Everything else aborts the run.

use iconsync_core::CoreError;
use std::path::PathBuf;

/// Failure obtaining or inspecting the working copy. Fatal for the run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Failed to clone {url}: {source}")]
    Clone {
        url: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to fetch revision {revision}: {source}")]
    Fetch {
        revision: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to resolve HEAD: {0}")]
    Resolve(#[source] git2::Error),

    #[error("Failed to diff {old}..{new}: {source}")]
    Diff {
        old: String,
        new: String,
        #[source]
        source: git2::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Failure talking to a remote HTTP service
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Whether the service asked us to slow down (HTTP 429)
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ServiceError::Status { code: 429, .. })
    }
}

impl From<ureq::Error> for ServiceError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, response) => ServiceError::Status {
                code,
                body: response.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(transport) => ServiceError::Transport(transport.to_string()),
        }
    }
}

/// Failure converting an SVG into a raster image
#[derive(Debug, thiserror::Error)]
pub enum RasterizeError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("{0} produced no output")]
    Empty(String),
}

/// Failure processing a single icon. Recovered locally by the batch loops.
#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Asset(#[from] CoreError),

    #[error("Rasterization failed: {0}")]
    Rasterize(#[from] RasterizeError),

    #[error("Embedding failed: {0}")]
    Embed(#[source] ServiceError),

    #[error("Tag lookup failed: {0}")]
    Tag(#[source] ServiceError),
}

/// Failure sending a batch to the document store or training service.
/// Not isolated: aborts the run, earlier batches stay uploaded.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Upload of {items} items failed: {source}")]
    Batch {
        items: usize,
        #[source]
        source: ServiceError,
    },

    #[error("Failed to load training tags: {0}")]
    Tags(#[source] ServiceError),
}

/// Everything that can end a pipeline run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Sync state error: {0:#}")]
    State(anyhow::Error),
}
