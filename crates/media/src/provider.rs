//! Image provider trait and the ordered fallback chain.

use async_trait::async_trait;

/// Errors from an individual image provider.
///
/// The chain treats an erroring provider like one that returned no result:
/// it logs the failure and moves to the next provider.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Provider API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Object storage error: {0}")]
    Storage(String),
}

/// Desired shape of the acquired image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    Landscape,
    Square,
}

impl AspectRatio {
    /// Pixel dimensions requested from the AI image provider.
    pub fn as_size(self) -> &'static str {
        match self {
            Self::Landscape => "1536x1024",
            Self::Square => "1024x1024",
        }
    }

    /// Orientation keyword for stock-photo search.
    pub fn orientation(self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
            Self::Square => "square",
        }
    }
}

/// What to look for: derived from the business facts, not user-supplied.
#[derive(Debug, Clone)]
pub struct ImageQuery {
    /// Short subject line, e.g. `"bakery storefront"`.
    pub subject: String,
    /// Optional style hint for the AI provider, e.g. a brand color.
    pub style: Option<String>,
    pub aspect_ratio: AspectRatio,
}

/// A single image source. Providers report "no result" with `Ok(None)`;
/// `Err` is reserved for unexpected failures worth logging.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Try to produce a publicly reachable image URL for the query.
    async fn attempt(&self, query: &ImageQuery) -> Result<Option<String>, MediaError>;
}

/// Terminal provider returning a fixed static URL. Never fails, never
/// returns `None`.
pub struct StaticFallback {
    url: String,
}

impl StaticFallback {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

#[async_trait]
impl ImageProvider for StaticFallback {
    fn name(&self) -> &'static str {
        "static_fallback"
    }

    async fn attempt(&self, _query: &ImageQuery) -> Result<Option<String>, MediaError> {
        Ok(Some(self.url.clone()))
    }
}

/// Ordered provider chain. Providers are consulted strictly in order and
/// the first non-empty result wins; lower-priority providers are never
/// invoked once a higher one succeeds.
pub struct ImageChain {
    providers: Vec<Box<dyn ImageProvider>>,
    /// Same URL the terminal [`StaticFallback`] holds; returned directly
    /// if the chain was somehow built without one.
    fallback_url: String,
}

impl ImageChain {
    /// Build a chain from explicit providers. The static fallback is
    /// always appended last.
    pub fn new(mut providers: Vec<Box<dyn ImageProvider>>, fallback_url: String) -> Self {
        providers.push(Box::new(StaticFallback::new(fallback_url.clone())));
        Self {
            providers,
            fallback_url,
        }
    }

    /// Resolve a query to an image URL. Infallible: if every provider
    /// declines or errors, the static fallback URL is returned.
    pub async fn resolve(&self, query: &ImageQuery) -> String {
        for provider in &self.providers {
            match provider.attempt(query).await {
                Ok(Some(url)) => {
                    tracing::info!(provider = provider.name(), url = %url, "Image acquired");
                    return url;
                }
                Ok(None) => {
                    tracing::debug!(provider = provider.name(), "Provider had no result");
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Provider failed");
                }
            }
        }
        self.fallback_url.clone()
    }
}
