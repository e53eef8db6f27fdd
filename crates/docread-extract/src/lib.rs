//! # docread-extract
//!
//! Format dispatch and text extraction for docread.
//!
//! A file is classified by extension, handed to the extractor for its
//! format, and returned as [`ExtractedText`](docread_core::ExtractedText).
//! Scanned pages and embedded images go through an
//! [`OcrEngine`](docread_core::OcrEngine); a failed OCR call only drops the
//! text of that image.
//!
//! ## Supported Formats
//!
//! | Extractor | Formats | Notes |
//! |-----------|---------|-------|
//! | [`PdfExtractor`] | `.pdf` | Text layer via pdf-extract, per-page OCR when there is none |
//! | [`ImageExtractor`] | `.jpg`, `.jpeg`, `.png`, `.bmp`, `.gif`, `.tiff`, `.tif` | Whole file sent to OCR |
//! | [`WordExtractor`] | `.docx` (`.doc` is rejected) | Paragraph text, then OCR of embedded images |
//! | [`PresentationExtractor`] | `.pptx` (`.ppt` is rejected) | Shape text with picture OCR inline, per slide |
//! | [`SpreadsheetExtractor`] | `.xlsx`, `.xlsm`, `.xls`, `.ods`, `.csv` | One pipe-delimited table per sheet |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use docread_extract::DocumentReader;
//! use std::sync::Arc;
//!
//! let reader = DocumentReader::with_ocr(Arc::new(ocr_engine));
//! let outcome = reader.read(Path::new("report.pdf")).await?;
//! println!("{}", outcome.render());
//! ```
//!
//! ## Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`DocumentReader`] | Existence check, classification, dispatch |
//! | [`ExtractorRegistry`] | Maps each [`DocumentFormat`](docread_core::DocumentFormat) to its extractor |
//! | [`PdfiumRasterizer`] | Renders PDF pages for OCR |
//! | [`LopdfRasterizer`] | Reads page images embedded in a scanned PDF |

pub mod classify;
mod fallback;
pub mod image;
mod ooxml;
pub mod pdf;
pub mod raster;
pub mod reader;
pub mod render;
pub mod registry;
pub mod sheet;
pub mod slides;
pub mod word;

#[cfg(test)]
mod test_support;

pub use crate::image::ImageExtractor;
pub use classify::{classify, extension_of};
pub use pdf::PdfExtractor;
pub use raster::LopdfRasterizer;
pub use reader::DocumentReader;
pub use render::PdfiumRasterizer;
pub use registry::ExtractorRegistry;
pub use sheet::SpreadsheetExtractor;
pub use slides::PresentationExtractor;
pub use word::WordExtractor;
