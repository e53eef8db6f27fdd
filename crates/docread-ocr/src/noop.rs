//! No-op OCR engine.
//!
//! Stands in for the remote service when no API key is configured. Every
//! request fails with [`OcrError::NotConfigured`], so images and scanned
//! pages contribute no text while direct extraction still works.

use async_trait::async_trait;
use docread_core::{OcrEngine, OcrError, OcrRequest};
use tracing::debug;

/// OCR engine that recognizes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOcrEngine;

impl NoopOcrEngine {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OcrEngine for NoopOcrEngine {
    fn name(&self) -> &str {
        "noop"
    }

    async fn recognize(&self, request: OcrRequest) -> Result<String, OcrError> {
        debug!("OCR not configured, skipping {}", request.file_name);
        Err(OcrError::NotConfigured)
    }
}
