//! Error types for docread.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for docread operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Content extraction failed
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractError),

    /// OCR request failed
    #[error("ocr error: {0}")]
    Ocr(#[from] OcrError),

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Content extraction errors.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("extraction failed: {0}")]
    Failed(String),
}

/// Errors reported by an OCR engine.
///
/// Extractors never propagate these; a failed request means the image
/// contributes no text.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR engine not configured")]
    NotConfigured,

    #[error("OCR service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("OCR request failed: {0}")]
    Transport(String),

    #[error("invalid OCR response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for docread operations.
pub type Result<T> = std::result::Result<T, Error>;
