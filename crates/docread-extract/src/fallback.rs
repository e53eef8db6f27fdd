//! OCR fallback shared by the extractors.

use ::image::ImageFormat;
use docread_core::{OcrEngine, OcrError, OcrRequest};
use std::path::Path;
use tracing::{debug, warn};

/// Run OCR, treating any failure or empty answer as "no text".
pub(crate) async fn recognize_or_skip(ocr: &dyn OcrEngine, request: OcrRequest) -> Option<String> {
    let file_name = request.file_name.clone();

    match ocr.recognize(request).await {
        Ok(text) if text.trim().is_empty() => {
            debug!("OCR returned no text for {}", file_name);
            None
        }
        Ok(text) => Some(text),
        Err(OcrError::NotConfigured) => {
            debug!("OCR not configured, no text for {}", file_name);
            None
        }
        Err(e) => {
            warn!("OCR failed for {} ({}): {}", file_name, ocr.name(), e);
            None
        }
    }
}

/// MIME type of an image, sniffed from its bytes, else from its name.
pub(crate) fn detect_mime(data: &[u8], name: &str) -> String {
    if let Ok(format) = ::image::guess_format(data) {
        return format.to_mime_type().to_string();
    }

    Path::new(name)
        .extension()
        .and_then(ImageFormat::from_extension)
        .map_or("application/octet-stream", |format| format.to_mime_type())
        .to_string()
}
