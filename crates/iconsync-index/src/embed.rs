//! Image embedding through Azure AI Vision

use serde::Deserialize;
use std::time::Duration;

use crate::error::ServiceError;

/// Turns raster image bytes into a fixed-length feature vector
pub trait Embedder {
    fn embed(&self, image: &[u8]) -> Result<Vec<f32>, ServiceError>;
}

const VECTORIZE_PATH: &str =
    "computervision/retrieval:vectorizeImage?api-version=2024-02-01&model-version=2023-04-15";

#[derive(Deserialize)]
struct VectorizeResponse {
    vector: Vec<f32>,
}

/// Client for the `retrieval:vectorizeImage` endpoint
pub struct VisionEmbedder {
    agent: ureq::Agent,
    endpoint: String,
    key: String,
}

impl VisionEmbedder {
    pub fn new(endpoint: &str, key: &str, timeout: Duration) -> Self {
        Self {
            agent: crate::http::agent(timeout),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key: key.to_string(),
        }
    }

    fn url(&self) -> String {
        format!("{}/{}", self.endpoint, VECTORIZE_PATH)
    }
}

impl Embedder for VisionEmbedder {
    fn embed(&self, image: &[u8]) -> Result<Vec<f32>, ServiceError> {
        let response = self
            .agent
            .post(&self.url())
            .set("Ocp-Apim-Subscription-Key", &self.key)
            .set("Content-Type", "application/octet-stream")
            .send_bytes(image)?;

        let body: VectorizeResponse = response
            .into_json()
            .map_err(|e| ServiceError::Decode(e.to_string()))?;

        if body.vector.is_empty() {
            return Err(ServiceError::Decode("empty vector".to_string()));
        }
        Ok(body.vector)
    }
}
