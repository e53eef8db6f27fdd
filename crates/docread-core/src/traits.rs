//! Core traits for docread components.
//!
//! - [`ContentExtractor`]: Extract text from one document format
//! - [`OcrEngine`]: Recognize text in an image
//! - [`PageRasterizer`]: Turn PDF pages into images for OCR
//!
//! Each seam is a trait so implementations (and test doubles) can be swapped
//! without touching the reader pipeline.

use async_trait::async_trait;

use crate::error::{ExtractError, OcrError};
use crate::types::{Document, DocumentFormat, ExtractedText, OcrRequest, PageImage};

// ============================================================================
// Content Extraction
// ============================================================================

/// Trait for extracting text from files of one format.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// The format this extractor handles.
    fn format(&self) -> DocumentFormat;

    /// Extract text from a document.
    async fn extract(&self, document: &Document) -> Result<ExtractedText, ExtractError>;
}

// ============================================================================
// OCR
// ============================================================================

/// Capability interface for the remote OCR service.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Engine name, for logs.
    fn name(&self) -> &str;

    /// Recognize the text in `request`.
    async fn recognize(&self, request: OcrRequest) -> Result<String, OcrError>;
}

// ============================================================================
// Rasterization
// ============================================================================

/// Turns the pages of a PDF into images.
///
/// Called from a blocking context. Pages that cannot be rasterized are
/// omitted from the result; an error means the document as a whole could
/// not be processed.
pub trait PageRasterizer: Send + Sync {
    fn rasterize(&self, pdf: &[u8]) -> Result<Vec<PageImage>, ExtractError>;
}
