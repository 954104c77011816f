//! Durable object storage for generated and uploaded images (S3 API).

use aws_sdk_s3::primitives::ByteStream;

/// Errors from the object storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("S3 put failed: {0}")]
    Put(String),

    #[error("S3 delete failed: {0}")]
    Delete(String),
}

/// Configuration for the S3-compatible bucket.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    /// Base URL objects are publicly served from (CDN or bucket website).
    pub public_base_url: String,
    /// Optional custom endpoint for S3-compatible stores.
    pub endpoint: Option<String>,
}

impl StorageConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `S3_BUCKET` or `S3_PUBLIC_BASE_URL` is unset,
    /// signalling that object storage is not configured.
    ///
    /// | Variable             | Required | Default |
    /// |----------------------|----------|---------|
    /// | `S3_BUCKET`          | yes      | --       |
    /// | `S3_PUBLIC_BASE_URL` | yes      | --       |
    /// | `S3_ENDPOINT`        | no       | --       |
    pub fn from_env() -> Option<Self> {
        let bucket = std::env::var("S3_BUCKET").ok()?;
        let public_base_url = std::env::var("S3_PUBLIC_BASE_URL").ok()?;
        Some(Self {
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            endpoint: std::env::var("S3_ENDPOINT").ok(),
        })
    }
}

/// S3-backed object storage with public read URLs.
pub struct ObjectStorage {
    client: aws_sdk_s3::Client,
    config: StorageConfig,
}

impl ObjectStorage {
    /// Build a storage handle using ambient AWS credentials.
    pub async fn new(config: StorageConfig) -> Self {
        let aws_config = aws_config::load_from_env().await;
        let client = match &config.endpoint {
            Some(endpoint) => {
                let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
                    .endpoint_url(endpoint)
                    .force_path_style(true)
                    .build();
                aws_sdk_s3::Client::from_conf(s3_config)
            }
            None => aws_sdk_s3::Client::new(&aws_config),
        };
        Self { client, config }
    }

    /// Durably store bytes under `key`, returning the public URL.
    pub async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Put(e.to_string()))?;

        tracing::info!(key, "Object stored");
        Ok(self.public_url(key))
    }

    /// Remove the object under `key`.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete(e.to_string()))?;

        tracing::info!(key, "Object deleted");
        Ok(())
    }

    /// Public URL an object is served from.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.config.public_base_url, key)
    }
}

/// Read image dimensions from the header bytes without a full decode.
pub fn image_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}
