//! Chat-completion client for the external content model.
//!
//! Every call is bounded by a hard wall-clock timeout. A timed-out call's
//! future is dropped on the spot -- the provider gets no cancellation
//! signal, and any late response is discarded rather than applied.

use serde::Deserialize;

/// Default wall-clock deadline for one model call, in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the content model endpoint.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Base URL of an OpenAI-compatible chat-completions API.
    pub api_url: String,
    pub api_key: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Hard deadline for one call.
    pub timeout_secs: u64,
}

impl ModelConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `CONTENT_MODEL_API_URL` or `CONTENT_MODEL_API_KEY`
    /// is unset, signalling that generation is not configured.
    ///
    /// | Variable                 | Required | Default        |
    /// |--------------------------|----------|----------------|
    /// | `CONTENT_MODEL_API_URL`  | yes      | --              |
    /// | `CONTENT_MODEL_API_KEY`  | yes      | --              |
    /// | `CONTENT_MODEL_NAME`     | no       | `gpt-4o-mini`  |
    /// | `CONTENT_MODEL_TIMEOUT_SECS` | no   | `60`           |
    pub fn from_env() -> Option<Self> {
        let api_url = std::env::var("CONTENT_MODEL_API_URL").ok()?;
        let api_key = std::env::var("CONTENT_MODEL_API_KEY").ok()?;
        Some(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            model: std::env::var("CONTENT_MODEL_NAME")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            timeout_secs: std::env::var("CONTENT_MODEL_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }
}

/// Errors from the content-model client.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The call exceeded its wall-clock deadline. Retryable.
    #[error("Model call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Model API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for logging; never shown to callers.
        body: String,
    },

    /// The API answered 2xx but with no usable completion.
    #[error("Model returned an empty completion")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// HTTP client for the content model.
pub struct ModelClient {
    client: reqwest::Client,
    config: ModelConfig,
}

impl ModelClient {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Build a client from the environment, or `None` when unconfigured.
    pub fn from_env() -> Option<Self> {
        ModelConfig::from_env().map(Self::new)
    }

    /// Hard deadline applied to each call, in seconds.
    pub fn timeout_secs(&self) -> u64 {
        self.config.timeout_secs
    }

    /// Run one completion and return the raw assistant text.
    ///
    /// The caller strips code fences and validates document structure; this
    /// method only enforces the deadline and the HTTP contract.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, ModelError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });

        // The deadline covers the request and the body read together.
        let deadline = std::time::Duration::from_secs(self.config.timeout_secs);
        let call = async {
            let response = self
                .client
                .post(format!("{}/v1/chat/completions", self.config.api_url))
                .bearer_auth(&self.config.api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ModelError::Api {
                    status: status.as_u16(),
                    body,
                });
            }

            let completion: CompletionResponse = response.json().await?;
            completion
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .filter(|text| !text.trim().is_empty())
                .ok_or(ModelError::Empty)
        };

        match tokio::time::timeout(deadline, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.config.timeout_secs,
                    "Model call exceeded deadline, discarding"
                );
                Err(ModelError::Timeout {
                    secs: self.config.timeout_secs,
                })
            }
        }
    }
}
