//! # docread-ocr
//!
//! OCR engines for docread. Every engine implements
//! [`OcrEngine`](docread_core::OcrEngine), the capability interface the
//! extractors use for scanned pages and embedded images.
//!
//! ## Engines
//!
//! | Type | Description |
//! |------|-------------|
//! | [`HttpOcrEngine`] | Multipart POST to a remote OCR service with a bearer token |
//! | [`NoopOcrEngine`] | Used when no credential is configured; every request fails |
//! | [`MockOcrEngine`] | Scripted responses and request capture for tests |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use docread_ocr::{HttpOcrConfig, HttpOcrEngine};
//! use docread_core::{OcrEngine, OcrRequest};
//!
//! let engine = HttpOcrEngine::new(HttpOcrConfig::new(api_key))?;
//! let text = engine
//!     .recognize(OcrRequest::image(bytes, "scan.png", "image/png"))
//!     .await?;
//! ```
//!
//! Callers treat any [`OcrError`](docread_core::OcrError) as "no text for
//! this image". Engines do not retry.

pub mod http;
pub mod mock;
pub mod noop;

pub use http::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, HttpOcrConfig, HttpOcrEngine};
pub use mock::{MockOcrEngine, MockOcrResponse};
pub use noop::NoopOcrEngine;
