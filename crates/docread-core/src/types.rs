//! Core types for docread.
//!
//! ## Documents
//! - [`DocumentFormat`]: Category of a document, inferred from its extension
//! - [`Document`]: A path plus its format, alive for one extraction call
//!
//! ## Results
//! - [`Segment`] / [`SegmentLabel`]: One labeled piece of text
//! - [`ExtractedText`]: Ordered segments for a document
//! - [`ReadOutcome`]: What the reader hands back to its caller
//!
//! ## OCR
//! - [`OcrKind`]: The `type` field sent with an OCR request
//! - [`OcrRequest`]: Image payload for the OCR service
//! - [`PageImage`]: A rasterized PDF page

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Marker placed before OCR text of an embedded image in rendered output.
pub const IMAGE_CONTENT_MARKER: &str = "[IMAGE CONTENT]";

// ============================================================================
// Documents
// ============================================================================

/// Document category used to select an extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Image,
    Word,
    Presentation,
    Spreadsheet,
}

impl DocumentFormat {
    /// Every format, in dispatch order.
    pub const ALL: [DocumentFormat; 5] = [
        DocumentFormat::Pdf,
        DocumentFormat::Image,
        DocumentFormat::Word,
        DocumentFormat::Presentation,
        DocumentFormat::Spreadsheet,
    ];

    /// Lowercase extensions (without the dot) handled by this format.
    #[must_use]
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Pdf => &["pdf"],
            Self::Image => &["jpg", "jpeg", "png", "bmp", "gif", "tiff", "tif"],
            Self::Word => &["docx", "doc"],
            Self::Presentation => &["pptx", "ppt"],
            Self::Spreadsheet => &["xlsx", "xlsm", "xls", "ods", "csv"],
        }
    }

    /// Map an extension (with or without a leading dot, any case) to a format.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.extensions().contains(&ext.as_str()))
    }

    /// Classify a path by its extension. Never touches the file system.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Image => "Image",
            Self::Word => "Word",
            Self::Presentation => "Presentation",
            Self::Spreadsheet => "Spreadsheet",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A file being extracted.
#[derive(Debug, Clone)]
pub struct Document {
    /// Path to the file
    pub path: PathBuf,
    /// Format inferred from the extension
    pub format: DocumentFormat,
}

impl Document {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, format: DocumentFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// File name component, or `"document"` when the path has none.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| "document".to_string(), |n| n.to_string_lossy().into_owned())
    }
}

// ============================================================================
// Extraction results
// ============================================================================

/// Where a piece of text came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentLabel {
    /// Direct text of the whole document (PDF text layer, Word paragraphs)
    Body,
    /// OCR text of one rasterized PDF page (1-indexed)
    Page { number: u32 },
    /// Text of one shape on a slide (1-indexed)
    Slide { number: u32 },
    /// Rendered table of one spreadsheet sheet
    Sheet { name: String },
    /// OCR text of an image, with its slide when it sits on one
    ImageContent { slide: Option<u32> },
}

/// One labeled piece of extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub label: SegmentLabel,
    pub text: String,
}

impl Segment {
    #[must_use]
    pub fn body(text: impl Into<String>) -> Self {
        Self {
            label: SegmentLabel::Body,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn page(number: u32, text: impl Into<String>) -> Self {
        Self {
            label: SegmentLabel::Page { number },
            text: text.into(),
        }
    }

    #[must_use]
    pub fn slide(number: u32, text: impl Into<String>) -> Self {
        Self {
            label: SegmentLabel::Slide { number },
            text: text.into(),
        }
    }

    #[must_use]
    pub fn sheet(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: SegmentLabel::Sheet { name: name.into() },
            text: text.into(),
        }
    }

    #[must_use]
    pub fn image(slide: Option<u32>, text: impl Into<String>) -> Self {
        Self {
            label: SegmentLabel::ImageContent { slide },
            text: text.into(),
        }
    }

    /// Whether this segment holds OCR text of an image.
    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self.label, SegmentLabel::ImageContent { .. })
    }

    fn render(&self) -> String {
        match &self.label {
            SegmentLabel::Sheet { name } => format!("=== Sheet: {name} ===\n{}", self.text),
            SegmentLabel::ImageContent { .. } => format!("{IMAGE_CONTENT_MARKER}\n{}", self.text),
            SegmentLabel::Body | SegmentLabel::Page { .. } | SegmentLabel::Slide { .. } => {
                self.text.clone()
            }
        }
    }
}

/// Text extracted from one document, as ordered labeled segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    /// Format the text was extracted from
    pub format: DocumentFormat,
    /// Segments in output order
    pub segments: Vec<Segment>,
}

impl ExtractedText {
    #[must_use]
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            segments: Vec::new(),
        }
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Flatten to a single string with section markers.
    ///
    /// Segments are joined with newlines. An image file renders its OCR text
    /// verbatim; embedded images elsewhere are tagged with
    /// [`IMAGE_CONTENT_MARKER`].
    #[must_use]
    pub fn render(&self) -> String {
        if self.format == DocumentFormat::Image {
            return self
                .segments
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
        }

        self.segments
            .iter()
            .map(Segment::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Result of reading one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReadOutcome {
    /// Text was extracted (possibly none)
    Extracted(ExtractedText),
    /// No extractor handles this extension
    Unsupported { extension: String },
}

impl ReadOutcome {
    /// Text to show the user.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Extracted(text) => text.render(),
            Self::Unsupported { extension } if extension.is_empty() => {
                "Unsupported file type: (no extension)".to_string()
            }
            Self::Unsupported { extension } => format!("Unsupported file type: .{extension}"),
        }
    }

    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

// ============================================================================
// OCR
// ============================================================================

/// Payload type announced to the OCR service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrKind {
    Image,
    Pdf,
}

impl OcrKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Pdf => "pdf",
        }
    }
}

/// A single recognition request.
#[derive(Clone)]
pub struct OcrRequest {
    /// Encoded image (or PDF) bytes
    pub data: Vec<u8>,
    /// File name reported to the service
    pub file_name: String,
    /// MIME type of `data`
    pub mime_type: String,
    pub kind: OcrKind,
}

impl OcrRequest {
    #[must_use]
    pub fn image(
        data: Vec<u8>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            data,
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            kind: OcrKind::Image,
        }
    }
}

impl fmt::Debug for OcrRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrRequest")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("kind", &self.kind)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// One PDF page turned into an image.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// Page number (1-indexed)
    pub page: u32,
    /// Encoded image bytes
    pub data: Vec<u8>,
    /// MIME type of `data`
    pub mime_type: String,
}

impl PageImage {
    /// File name used when the page is submitted for OCR.
    #[must_use]
    pub fn file_name(&self) -> String {
        let ext = match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/jp2" => "jp2",
            _ => "png",
        };
        format!("page-{}.{ext}", self.page)
    }
}
