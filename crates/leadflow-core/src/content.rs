//! AI content-generation collaborator
//!
//! The promo front-end occasionally asks an external text-generation
//! service for copy. The service may be unconfigured, unreachable, or
//! return something unusable; every call site resolves to a static
//! fallback instead of surfacing an error.

use async_trait::async_trait;
use leadflow_common::config::ContentConfig;
use leadflow_common::{Error, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Text-generation capability
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate free-form text for a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with a static fallback; never fails
    async fn generate_or(&self, prompt: &str, fallback: &str) -> String {
        match self.generate(prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Content generation failed, using fallback: {}", e);
                fallback.to_string()
            }
        }
    }
}

/// Response shape of the generation service
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    text: String,
}

/// HTTP-backed generator. With no endpoint configured every call is an
/// error, which `generate_or` turns into the fallback.
pub struct HttpContentGenerator {
    endpoint: Option<String>,
    client: reqwest::Client,
}

impl HttpContentGenerator {
    pub fn new(config: &ContentConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            endpoint: config.endpoint.clone(),
            client,
        }
    }
}

#[async_trait]
impl ContentGenerator for HttpContentGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| Error::Content("no generation endpoint configured".to_string()))?;

        let response = self
            .client
            .post(endpoint)
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await
            .map_err(|e| Error::Content(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Content(format!(
                "generation service returned status {}",
                response.status()
            )));
        }

        // A schema mismatch is a malformed response, handled the same as
        // an unreachable service.
        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Content(format!("malformed generation response: {}", e)))?;

        debug!(chars = parsed.text.len(), "Generated content");

        Ok(parsed.text)
    }
}
