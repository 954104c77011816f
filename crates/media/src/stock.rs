//! Stock-photo search provider (chain position 2).

use async_trait::async_trait;
use serde::Deserialize;

use crate::provider::{ImageProvider, ImageQuery, MediaError};

/// Configuration for the stock-photo search API.
#[derive(Debug, Clone)]
pub struct StockPhotoConfig {
    pub api_url: String,
    pub api_key: String,
}

impl StockPhotoConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `STOCK_PHOTO_API_KEY` is unset; the chain then
    /// falls straight through to the static fallback.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            api_url: std::env::var("STOCK_PHOTO_API_URL")
                .unwrap_or_else(|_| "https://api.pexels.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: std::env::var("STOCK_PHOTO_API_KEY").ok()?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    src: PhotoSources,
}

#[derive(Debug, Deserialize)]
struct PhotoSources {
    landscape: Option<String>,
    original: Option<String>,
}

/// Searches a stock-photo library with a derived text query.
pub struct StockPhotoProvider {
    client: reqwest::Client,
    config: StockPhotoConfig,
}

impl StockPhotoProvider {
    pub fn new(config: StockPhotoConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ImageProvider for StockPhotoProvider {
    fn name(&self) -> &'static str {
        "stock_photo"
    }

    async fn attempt(&self, query: &ImageQuery) -> Result<Option<String>, MediaError> {
        let response = self
            .client
            .get(format!("{}/v1/search", self.config.api_url))
            .header("Authorization", &self.config.api_key)
            .query(&[
                ("query", query.subject.as_str()),
                ("orientation", query.aspect_ratio.orientation()),
                ("per_page", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let results: SearchResponse = response.json().await?;
        let url = results
            .photos
            .into_iter()
            .next()
            .and_then(|p| p.src.landscape.or(p.src.original));
        Ok(url)
    }
}
