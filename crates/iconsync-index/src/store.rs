//! Document upload to Azure AI Search

use iconsync_core::IndexDocument;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ServiceError, UploadError};

/// Destination for index documents.
///
/// `upsert` inserts or replaces every document by its `id`, so uploading the
/// same icon twice leaves a single document holding the latest data.
pub trait DocumentStore {
    fn upsert(&self, documents: &[IndexDocument]) -> Result<(), UploadError>;
}

const API_VERSION: &str = "2023-11-01";

#[derive(Serialize)]
struct IndexAction<'a> {
    #[serde(rename = "@search.action")]
    action: &'static str,
    #[serde(flatten)]
    document: &'a IndexDocument,
}

#[derive(Serialize)]
struct IndexBatch<'a> {
    value: Vec<IndexAction<'a>>,
}

#[derive(Debug, Deserialize)]
struct IndexingResult {
    key: String,
    status: bool,
    #[serde(rename = "errorMessage")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IndexingResponse {
    #[serde(default)]
    value: Vec<IndexingResult>,
}

/// Client for the `docs/index` endpoint of one search index
pub struct SearchIndexClient {
    agent: ureq::Agent,
    endpoint: String,
    key: String,
    index: String,
}

impl SearchIndexClient {
    pub fn new(endpoint: &str, key: &str, index: &str, timeout: Duration) -> Self {
        Self {
            agent: crate::http::agent(timeout),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key: key.to_string(),
            index: index.to_string(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/indexes/{}/docs/index?api-version={}",
            self.endpoint, self.index, API_VERSION
        )
    }
}

fn upload_batch(documents: &[IndexDocument]) -> IndexBatch<'_> {
    IndexBatch {
        value: documents
            .iter()
            .map(|document| IndexAction {
                action: "upload",
                document,
            })
            .collect(),
    }
}

impl DocumentStore for SearchIndexClient {
    fn upsert(&self, documents: &[IndexDocument]) -> Result<(), UploadError> {
        let batch_err = |source| UploadError::Batch {
            items: documents.len(),
            source,
        };

        let response = self
            .agent
            .post(&self.url())
            .set("api-key", &self.key)
            .send_json(upload_batch(documents))
            .map_err(|e| batch_err(ServiceError::from(e)))?;

        // 207 means some documents were rejected; the rest are stored
        let body: IndexingResponse = response
            .into_json()
            .map_err(|e| batch_err(ServiceError::Decode(e.to_string())))?;

        for result in body.value.iter().filter(|r| !r.status) {
            log::warn!(
                "Document {} rejected by index: {}",
                result.key,
                result.error_message.as_deref().unwrap_or("no message")
            );
        }

        Ok(())
    }
}
