//! AI image generation provider (chain position 1).
//!
//! Asks an image-generation API for a business- and style-appropriate
//! image, downloads the result, and uploads it to durable object storage
//! so the site never depends on the provider's ephemeral URLs.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::provider::{ImageProvider, ImageQuery, MediaError};
use crate::storage::ObjectStorage;

/// Configuration for the AI image provider.
#[derive(Debug, Clone)]
pub struct AiImageConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

impl AiImageConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `IMAGE_MODEL_API_URL` or `IMAGE_MODEL_API_KEY` is
    /// unset; the chain then simply starts at the stock-photo provider.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            api_url: std::env::var("IMAGE_MODEL_API_URL")
                .ok()?
                .trim_end_matches('/')
                .to_string(),
            api_key: std::env::var("IMAGE_MODEL_API_KEY").ok()?,
            model: std::env::var("IMAGE_MODEL_NAME").unwrap_or_else(|_| "dall-e-3".to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: Option<String>,
}

/// Generates an image and persists it to object storage.
pub struct AiImageProvider {
    client: reqwest::Client,
    config: AiImageConfig,
    storage: Arc<ObjectStorage>,
}

impl AiImageProvider {
    pub fn new(config: AiImageConfig, storage: Arc<ObjectStorage>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            storage,
        }
    }

    fn prompt(query: &ImageQuery) -> String {
        let mut prompt = format!(
            "A professional, photorealistic website hero image of {}.",
            query.subject
        );
        if let Some(style) = &query.style {
            prompt.push_str(&format!(" Style: {style}."));
        }
        prompt.push_str(" No text or watermarks.");
        prompt
    }
}

#[async_trait]
impl ImageProvider for AiImageProvider {
    fn name(&self) -> &'static str {
        "ai_image"
    }

    async fn attempt(&self, query: &ImageQuery) -> Result<Option<String>, MediaError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": Self::prompt(query),
            "size": query.aspect_ratio.as_size(),
            "n": 1,
        });

        let response = self
            .client
            .post(format!("{}/v1/images/generations", self.config.api_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let generated: GenerationResponse = response.json().await?;
        let Some(ephemeral_url) = generated.data.into_iter().next().and_then(|d| d.url) else {
            return Ok(None);
        };

        // Re-host: the provider's URL expires, ours does not.
        let bytes = self
            .client
            .get(&ephemeral_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let key = format!("generated/{}.png", uuid::Uuid::new_v4());
        let url = self
            .storage
            .put(key.as_str(), bytes.to_vec(), "image/png")
            .await
            .map_err(|e| MediaError::Storage(e.to_string()))?;

        Ok(Some(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::AspectRatio;

    #[test]
    fn prompt_carries_subject_and_style() {
        let query = ImageQuery {
            subject: "bakery storefront".to_string(),
            style: Some("warm green tones".to_string()),
            aspect_ratio: AspectRatio::Landscape,
        };
        let prompt = AiImageProvider::prompt(&query);
        assert!(prompt.contains("bakery storefront"));
        assert!(prompt.contains("warm green tones"));
        assert!(prompt.contains("No text"));
    }
}
