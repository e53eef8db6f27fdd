//! Remote OCR service client.
//!
//! Sends one multipart request per image:
//!
//! - `Authorization: Bearer <key>` and `Accept: application/json`
//! - a `file` part carrying the image bytes
//! - a `type` field, `image` or `pdf`
//!
//! A `200 OK` response carries JSON with a `text` field. Anything else is a
//! failure.

use async_trait::async_trait;
use docread_core::{OcrEngine, OcrError, OcrRequest};
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Mistral OCR endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.mistral.ai/v1/ocr";

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for [`HttpOcrEngine`].
#[derive(Clone)]
pub struct HttpOcrConfig {
    /// Endpoint URL
    pub endpoint: String,
    /// Bearer token
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
}

impl HttpOcrConfig {
    /// Settings for the default endpoint with the given key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for HttpOcrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpOcrConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct OcrResponseBody {
    #[serde(default)]
    text: String,
}

/// OCR engine backed by a remote HTTP service.
#[derive(Debug)]
pub struct HttpOcrEngine {
    client: Client,
    config: HttpOcrConfig,
}

impl HttpOcrEngine {
    /// Build the engine and its HTTP client.
    pub fn new(config: HttpOcrConfig) -> Result<Self, OcrError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OcrError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl OcrEngine for HttpOcrEngine {
    fn name(&self) -> &str {
        "http"
    }

    async fn recognize(&self, request: OcrRequest) -> Result<String, OcrError> {
        debug!(
            "Submitting {} ({} bytes) to {}",
            request.file_name,
            request.data.len(),
            self.config.endpoint
        );

        let part = Part::bytes(request.data)
            .file_name(request.file_name)
            .mime_str(&request.mime_type)
            .map_err(|e| OcrError::Transport(format!("invalid MIME type: {e}")))?;

        let form = Form::new()
            .part("file", part)
            .text("type", request.kind.as_str());

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| OcrError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: OcrResponseBody = response
            .json()
            .await
            .map_err(|e| OcrError::InvalidResponse(e.to_string()))?;

        Ok(body.text)
    }
}
