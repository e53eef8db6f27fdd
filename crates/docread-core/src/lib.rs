//! # docread-core
//!
//! Core types and traits for docread, a document text extractor with an OCR
//! fallback for scanned and image content.
//!
//! This crate provides the foundational abstractions used throughout docread:
//!
//! - **Content Extraction**: [`ContentExtractor`] trait for pulling text out of one document format
//! - **OCR**: [`OcrEngine`] capability trait for the remote recognition service
//! - **Rasterization**: [`PageRasterizer`] trait for turning PDF pages into images
//!
//! ## Architecture
//!
//! ```text
//! Path -> DocumentFormat -> ContentExtractor -> ExtractedText
//!                                 |
//!                                 +-- no text layer / images --> PageRasterizer --> OcrEngine
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`DocumentFormat`] | The five supported document categories |
//! | [`Document`] | A file path paired with its inferred format |
//! | [`Segment`] | One labeled piece of extracted text |
//! | [`ExtractedText`] | Ordered segments for one document, renderable to a flat string |
//! | [`ReadOutcome`] | Extracted text, or the unsupported-format marker |
//! | [`OcrRequest`] | Image payload sent to the OCR service |
//!
//! ## Related Crates
//!
//! - `docread-ocr`: OCR engine implementations (HTTP, no-op, mock)
//! - `docread-extract`: Format classifier, extractors and the reader pipeline

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, ExtractError, OcrError, Result};
pub use traits::*;
pub use types::*;
