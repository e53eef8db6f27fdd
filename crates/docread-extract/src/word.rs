//! Word document extractor.
//!
//! Reads the paragraphs of `word/document.xml` in document order, then OCRs
//! every image the document part references. Image text always follows the
//! paragraph text, regardless of where the image sits in the body.
//!
//! Paragraphs inside tables and text boxes are not part of the body text.
//! Legacy `.doc` files are not zip packages and fail to open.

use async_trait::async_trait;
use docread_core::{
    ContentExtractor, Document, DocumentFormat, ExtractError, ExtractedText, OcrEngine, Segment,
};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::fallback::recognize_or_skip;
use crate::ooxml::{EmbeddedImage, Package, malformed, resolve_target};

const DOCUMENT_PART: &str = "word/document.xml";

/// Extractor for `.docx` files.
pub struct WordExtractor {
    ocr: Arc<dyn OcrEngine>,
}

impl WordExtractor {
    #[must_use]
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self { ocr }
    }
}

#[async_trait]
impl ContentExtractor for WordExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Word
    }

    async fn extract(&self, document: &Document) -> Result<ExtractedText, ExtractError> {
        debug!("Extracting Word document: {:?}", document.path);

        let bytes = tokio::fs::read(&document.path).await?;
        let content = tokio::task::spawn_blocking(move || read_docx(bytes))
            .await
            .map_err(|e| ExtractError::Failed(format!("Task join error: {e}")))??;

        let mut text = ExtractedText::new(DocumentFormat::Word);
        if !content.paragraphs.is_empty() {
            text.push(Segment::body(content.paragraphs.join("\n")));
        }

        debug!("Found {} embedded image(s)", content.images.len());
        for image in content.images {
            if let Some(image_text) = recognize_or_skip(self.ocr.as_ref(), image.into_request()).await
            {
                text.push(Segment::image(None, image_text));
            }
        }

        Ok(text)
    }
}

struct WordContent {
    paragraphs: Vec<String>,
    images: Vec<EmbeddedImage>,
}

fn read_docx(bytes: Vec<u8>) -> Result<WordContent, ExtractError> {
    let mut package = Package::open(bytes)?;
    let xml = package.read_xml(DOCUMENT_PART)?;
    let paragraphs = parse_paragraphs(&xml)?;

    let mut images = Vec::new();
    for rel in package.relationships(DOCUMENT_PART)? {
        if !rel.is_image() {
            continue;
        }
        let part = resolve_target(DOCUMENT_PART, &rel.target);
        match package.read_bytes(&part) {
            Ok(data) => images.push(EmbeddedImage { part, data }),
            Err(e) => warn!("Skipping image {}: {}", part, e),
        }
    }

    Ok(WordContent { paragraphs, images })
}

/// Body paragraphs, one string per `w:p`.
fn parse_paragraphs(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    // Depth of tables, text boxes and drawings around the cursor.
    let mut nested = 0usize;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(|e| malformed(DOCUMENT_PART, e))? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tbl" | b"txbxContent" | b"drawing" | b"pict" => nested += 1,
                b"p" if nested == 0 => current = Some(String::new()),
                b"r" if nested == 0 => in_run = true,
                b"t" if nested == 0 => in_text = true,
                _ => {}
            },
            Event::Empty(e) if nested == 0 => {
                let ch = match e.local_name().as_ref() {
                    b"p" => {
                        paragraphs.push(String::new());
                        None
                    }
                    b"tab" if in_run => Some('\t'),
                    b"br" | b"cr" if in_run => Some('\n'),
                    _ => None,
                };
                if let (Some(ch), Some(paragraph)) = (ch, current.as_mut()) {
                    paragraph.push(ch);
                }
            }
            Event::Text(t) if in_text && nested == 0 => {
                if let Some(paragraph) = current.as_mut() {
                    paragraph.push_str(&t.unescape().map_err(|e| malformed(DOCUMENT_PART, e))?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"tbl" | b"txbxContent" | b"drawing" | b"pict" => {
                    nested = nested.saturating_sub(1);
                }
                b"p" if nested == 0 => {
                    if let Some(paragraph) = current.take() {
                        paragraphs.push(paragraph);
                    }
                }
                b"r" if nested == 0 => in_run = false,
                b"t" if nested == 0 => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}
