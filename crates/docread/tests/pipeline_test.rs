//! Integration tests for the full docread pipeline.
//!
//! Tests the complete flow: classify → extract → OCR fallback → render.

use docread_core::{DocumentFormat, ExtractError, ReadOutcome, Segment, SegmentLabel};
use docread_extract::DocumentReader;
use docread_ocr::{MockOcrEngine, MockOcrResponse};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const IMAGE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(data).unwrap();
    }
    let bytes = zip.finish().unwrap().into_inner();
    std::fs::write(path, bytes).unwrap();
}

/// Word document with a picture between two paragraphs.
fn write_docx(path: &Path) {
    let document = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <w:body>
    <w:p><w:r><w:t>Inspection report</w:t></w:r></w:p>
    <w:p><w:r><w:drawing><a:blip xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" r:embed="rId4"/></w:drawing></w:r></w:p>
    <w:p><w:r><w:t>Signed, the inspector</w:t></w:r></w:p>
  </w:body>
</w:document>"#;
    let rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId4" Type="{IMAGE_REL}" Target="media/image1.png"/></Relationships>"#
    );
    write_zip(
        path,
        &[
            ("word/document.xml", document.as_bytes()),
            ("word/_rels/document.xml.rels", rels.as_bytes()),
            ("word/media/image1.png", PNG_BYTES),
        ],
    );
}

/// PDF whose pages are single JPEG images with no text layer.
fn write_scanned_pdf(path: &Path, pages: u8) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for n in 1..=pages {
        let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, n, 0xFF, 0xD9];
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 200,
                "Height" => 260,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        ));
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![200.into(), 0.into(), 0.into(), 260.into(), 0.into(), 0.into()],
                ),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
            "MediaBox" => vec![0.into(), 0.into(), 200.into(), 260.into()],
        });
        kids.push(page_id.into());
    }

    let count = i64::from(pages);
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

fn extracted(outcome: ReadOutcome) -> docread_core::ExtractedText {
    match outcome {
        ReadOutcome::Extracted(text) => text,
        other => panic!("Expected extracted text, got {other:?}"),
    }
}

fn file(dir: &Path, name: &str) -> PathBuf {
    dir.join(name)
}

#[tokio::test]
async fn test_word_image_text_follows_body() {
    let dir = tempdir().unwrap();
    let path = file(dir.path(), "report.docx");
    write_docx(&path);

    let ocr = Arc::new(MockOcrEngine::with_text("Serial no. 4471"));
    let reader = DocumentReader::with_ocr(ocr.clone());

    let text = extracted(reader.read(&path).await.unwrap());

    assert_eq!(text.format, DocumentFormat::Word);
    assert_eq!(
        text.render(),
        "Inspection report\n\nSigned, the inspector\n[IMAGE CONTENT]\nSerial no. 4471"
    );
    assert_eq!(ocr.call_count(), 1);
}

#[tokio::test]
async fn test_scanned_pdf_pages_in_order() {
    let dir = tempdir().unwrap();
    let path = file(dir.path(), "scan.PDF");
    write_scanned_pdf(&path, 2);

    let ocr = Arc::new(MockOcrEngine::with_responses([
        MockOcrResponse::text("Page one text"),
        MockOcrResponse::text("Page two text"),
    ]));
    let reader = DocumentReader::with_ocr(ocr.clone());

    let text = extracted(reader.read(&path).await.unwrap());

    assert_eq!(ocr.call_count(), 2);
    assert_eq!(
        text.segments,
        vec![Segment::page(1, "Page one text"), Segment::page(2, "Page two text")]
    );
}

#[tokio::test]
async fn test_ocr_outage_does_not_fail_extraction() {
    let dir = tempdir().unwrap();
    let docx = file(dir.path(), "report.docx");
    let png = file(dir.path(), "photo.png");
    write_docx(&docx);
    std::fs::write(&png, PNG_BYTES).unwrap();

    let ocr = Arc::new(MockOcrEngine::always(MockOcrResponse::Status(503)));
    let reader = DocumentReader::with_ocr(ocr.clone());

    let word = extracted(reader.read(&docx).await.unwrap());
    assert_eq!(word.render(), "Inspection report\n\nSigned, the inspector");
    assert!(word.segments.iter().all(|s| !s.is_image()));

    let image = extracted(reader.read(&png).await.unwrap());
    assert!(image.is_empty());

    assert_eq!(ocr.call_count(), 2);
}

#[tokio::test]
async fn test_csv_renders_as_named_sheet() {
    let dir = tempdir().unwrap();
    let path = file(dir.path(), "inventory.csv");
    std::fs::write(&path, "sku,qty,note\nA-1,4\nB-2,0,discontinued\n").unwrap();

    let reader = DocumentReader::with_ocr(Arc::new(MockOcrEngine::with_text("unused")));
    let text = extracted(reader.read(&path).await.unwrap());

    assert_eq!(
        text.segments[0].label,
        SegmentLabel::Sheet {
            name: "inventory".to_string()
        }
    );
    assert_eq!(
        text.render(),
        "=== Sheet: inventory ===\nsku | qty | note\nA-1 | 4 | \nB-2 | 0 | discontinued"
    );
}

#[tokio::test]
async fn test_unsupported_and_missing_files() {
    let dir = tempdir().unwrap();
    let zip_path = file(dir.path(), "bundle.zip");
    std::fs::write(&zip_path, b"PK\x05\x06").unwrap();

    let ocr = Arc::new(MockOcrEngine::with_text("unused"));
    let reader = DocumentReader::with_ocr(ocr.clone());

    let outcome = reader.read(&zip_path).await.unwrap();
    assert!(outcome.is_unsupported());
    assert_eq!(outcome.render(), "Unsupported file type: .zip");

    let missing = reader.read(&file(dir.path(), "gone.docx")).await;
    assert!(matches!(missing, Err(ExtractError::NotFound(_))));

    assert_eq!(ocr.call_count(), 0);
}

#[tokio::test]
async fn test_outcome_serializes_with_status_tag() {
    let dir = tempdir().unwrap();
    let path = file(dir.path(), "notes.csv");
    std::fs::write(&path, "a\n").unwrap();

    let reader = DocumentReader::with_ocr(Arc::new(MockOcrEngine::with_text("unused")));
    let outcome = reader.read(&path).await.unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "extracted");
    assert_eq!(json["format"], "spreadsheet");
    assert_eq!(json["segments"][0]["label"]["kind"], "sheet");
    assert_eq!(json["segments"][0]["text"], "a");
}
