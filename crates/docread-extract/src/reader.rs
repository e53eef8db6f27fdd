//! Document reader: the entry point for turning a file into text.
//!
//! ```text
//! path ─► exists? ─► classify ─► extractor ─► ExtractedText
//!            │           │
//!            ▼           ▼
//!        NotFound    Unsupported
//! ```

use docread_core::{Document, ExtractError, OcrEngine, ReadOutcome};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::classify::{classify, extension_of};
use crate::registry::ExtractorRegistry;

/// Reads documents of any supported format.
pub struct DocumentReader {
    registry: ExtractorRegistry,
}

impl DocumentReader {
    #[must_use]
    pub fn new(registry: ExtractorRegistry) -> Self {
        Self { registry }
    }

    /// Reader with the built-in extractors, all sharing `ocr`.
    #[must_use]
    pub fn with_ocr(ocr: Arc<dyn OcrEngine>) -> Self {
        Self::new(ExtractorRegistry::with_defaults(ocr))
    }

    /// Read one file.
    ///
    /// An unsupported extension is not an error: it yields
    /// [`ReadOutcome::Unsupported`] without touching any extractor.
    pub async fn read(&self, path: &Path) -> Result<ReadOutcome, ExtractError> {
        match tokio::fs::metadata(path).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ExtractError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        }

        let Some(extractor) = classify(path).and_then(|format| self.registry.get(format)) else {
            let extension = extension_of(path);
            info!("Unsupported file type for {}: .{}", path.display(), extension);
            return Ok(ReadOutcome::Unsupported { extension });
        };

        let document = Document::new(path, extractor.format());
        debug!("Reading {} as {}", path.display(), document.format);

        match extractor.extract(&document).await {
            Ok(text) => {
                debug!(
                    "Extracted {} segment(s) from {}",
                    text.segments.len(),
                    document.file_name()
                );
                Ok(ReadOutcome::Extracted(text))
            }
            Err(e) => {
                warn!("Failed to extract {}: {}", path.display(), e);
                Err(e)
            }
        }
    }
}
