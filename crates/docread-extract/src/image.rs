//! Image file extractor.
//!
//! Image files have no text layer; the whole file goes to OCR.

use async_trait::async_trait;
use docread_core::{
    ContentExtractor, Document, DocumentFormat, ExtractError, ExtractedText, OcrEngine,
    OcrRequest, Segment,
};
use std::sync::Arc;
use tracing::debug;

use crate::fallback::{detect_mime, recognize_or_skip};

/// Extractor for image files.
pub struct ImageExtractor {
    ocr: Arc<dyn OcrEngine>,
}

impl ImageExtractor {
    #[must_use]
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self { ocr }
    }
}

#[async_trait]
impl ContentExtractor for ImageExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Image
    }

    async fn extract(&self, document: &Document) -> Result<ExtractedText, ExtractError> {
        debug!("Extracting image: {:?}", document.path);

        let data = tokio::fs::read(&document.path).await?;
        let file_name = document.file_name();
        let mime_type = detect_mime(&data, &file_name);
        let request = OcrRequest::image(data, file_name, mime_type);

        let mut text = ExtractedText::new(DocumentFormat::Image);
        if let Some(ocr_text) = recognize_or_skip(self.ocr.as_ref(), request).await {
            text.push(Segment::image(None, ocr_text));
        }
        Ok(text)
    }
}
