//! PDF content extractor.
//!
//! Uses pdf-extract for the text layer. When a document has no text layer
//! (or pdf-extract cannot read it), each page is rasterized and sent to OCR.

use async_trait::async_trait;
use docread_core::{
    ContentExtractor, Document, DocumentFormat, ExtractError, ExtractedText, OcrEngine,
    OcrRequest, PageRasterizer, Segment,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::fallback::recognize_or_skip;
use crate::render::PdfiumRasterizer;

/// Extractor for PDF files.
pub struct PdfExtractor {
    ocr: Arc<dyn OcrEngine>,
    rasterizer: Arc<dyn PageRasterizer>,
}

impl PdfExtractor {
    /// Create a PDF extractor that renders scanned pages with PDFium.
    #[must_use]
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self::with_rasterizer(ocr, Arc::new(PdfiumRasterizer::new()))
    }

    #[must_use]
    pub fn with_rasterizer(ocr: Arc<dyn OcrEngine>, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        Self { ocr, rasterizer }
    }

    /// OCR every rasterized page, in page order.
    async fn ocr_pages(&self, bytes: Vec<u8>) -> Result<ExtractedText, ExtractError> {
        let rasterizer = Arc::clone(&self.rasterizer);
        let pages = tokio::task::spawn_blocking(move || rasterizer.rasterize(&bytes))
            .await
            .map_err(|e| ExtractError::Failed(format!("Task join error: {e}")))??;

        debug!("Running OCR on {} rasterized page(s)", pages.len());

        let mut text = ExtractedText::new(DocumentFormat::Pdf);
        for page in pages {
            let number = page.page;
            let file_name = page.file_name();
            let request = OcrRequest::image(page.data, file_name, page.mime_type);
            if let Some(page_text) = recognize_or_skip(self.ocr.as_ref(), request).await {
                text.push(Segment::page(number, page_text));
            }
        }
        Ok(text)
    }
}

#[async_trait]
impl ContentExtractor for PdfExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    async fn extract(&self, document: &Document) -> Result<ExtractedText, ExtractError> {
        debug!("Extracting PDF: {:?}", document.path);

        let bytes = tokio::fs::read(&document.path).await?;

        // A panic inside pdf-extract counts as a failed text layer.
        let direct = tokio::task::spawn_blocking({
            let bytes = bytes.clone();
            move || pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| e.to_string())
        .and_then(|result| result);

        match direct {
            Ok(layer) if !layer.trim().is_empty() => {
                let mut text = ExtractedText::new(DocumentFormat::Pdf);
                text.push(Segment::body(layer.trim()));
                Ok(text)
            }
            Ok(_) => {
                debug!("No text layer in {}, falling back to OCR", document.file_name());
                self.ocr_pages(bytes).await
            }
            Err(e) => {
                warn!(
                    "Text extraction failed for {}, falling back to OCR: {}",
                    document.file_name(),
                    e
                );
                self.ocr_pages(bytes).await
            }
        }
    }
}
