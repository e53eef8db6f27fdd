//! OOXML package access shared by the Word and presentation extractors.
//!
//! An OOXML file is a zip archive of XML parts. Parts reference each other
//! through relationship parts (`_rels/<part>.rels`), whose targets are
//! relative to the referencing part.

use docread_core::{ExtractError, OcrRequest};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fmt::Display;
use std::io::{Cursor, Read};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::fallback::detect_mime;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Upper bound on the buffer reserved from a part's declared size.
const PREALLOC_LIMIT: usize = 1 << 20;

/// An opened OOXML zip package.
pub(crate) struct Package {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl Package {
    pub(crate) fn open(bytes: Vec<u8>) -> Result<Self, ExtractError> {
        let archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ExtractError::Parse(format!("not an OOXML package: {e}")))?;
        Ok(Self { archive })
    }

    pub(crate) fn contains(&self, part: &str) -> bool {
        self.archive.index_for_name(part).is_some()
    }

    pub(crate) fn read_bytes(&mut self, part: &str) -> Result<Vec<u8>, ExtractError> {
        let mut file = self.archive.by_name(part).map_err(|e| match e {
            ZipError::FileNotFound => ExtractError::Parse(format!("missing part: {part}")),
            other => ExtractError::Parse(format!("cannot read part {part}: {other}")),
        })?;

        let mut buf = Vec::with_capacity(initial_capacity(file.size()));
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }

    pub(crate) fn read_xml(&mut self, part: &str) -> Result<String, ExtractError> {
        let bytes = self.read_bytes(part)?;
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ExtractError::Parse(format!("part {part} is not UTF-8: {e}")))
    }

    /// Relationships declared by `part`, in declaration order.
    ///
    /// A part without a relationship part has none.
    pub(crate) fn relationships(&mut self, part: &str) -> Result<Vec<Relationship>, ExtractError> {
        let rels_part = rels_path_for(part);
        if !self.contains(&rels_part) {
            return Ok(Vec::new());
        }
        let xml = self.read_xml(&rels_part)?;
        parse_relationships(&xml, &rels_part)
    }
}

/// One `<Relationship>` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Whether this relationship points at an image stored in the package.
    pub(crate) fn is_image(&self) -> bool {
        !self.external && self.rel_type.ends_with("/image")
    }
}

/// An image part pulled out of a package for OCR.
#[derive(Debug, Clone)]
pub(crate) struct EmbeddedImage {
    pub part: String,
    pub data: Vec<u8>,
}

impl EmbeddedImage {
    pub(crate) fn into_request(self) -> OcrRequest {
        let file_name = self
            .part
            .rsplit('/')
            .next()
            .unwrap_or(self.part.as_str())
            .to_string();
        let mime_type = detect_mime(&self.data, &file_name);
        OcrRequest::image(self.data, file_name, mime_type)
    }
}

pub(crate) fn parse_relationships(xml: &str, part: &str) -> Result<Vec<Relationship>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut relationships = Vec::new();

    loop {
        match reader.read_event().map_err(|e| malformed(part, e))? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut rel = Relationship::default();
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().map_err(|e| malformed(part, e))?;
                    match attr.key.local_name().as_ref() {
                        b"Id" => rel.id = value.into_owned(),
                        b"Type" => rel.rel_type = value.into_owned(),
                        b"Target" => rel.target = value.into_owned(),
                        b"TargetMode" => rel.external = value.eq_ignore_ascii_case("External"),
                        _ => {}
                    }
                }
                relationships.push(rel);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(relationships)
}

/// Relationship part for `part`: `word/document.xml` → `word/_rels/document.xml.rels`.
pub(crate) fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, name)) => format!("{dir}/_rels/{name}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolve a relationship target against the part that declares it.
pub(crate) fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = source_part.split('/').collect();
    segments.pop();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Value of a namespaced attribute such as `r:id` or `r:embed`.
pub(crate) fn relationship_attr(element: &BytesStart<'_>, local_name: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.prefix().is_some() && attr.key.local_name().as_ref() == local_name)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

pub(crate) fn malformed(part: &str, err: impl Display) -> ExtractError {
    ExtractError::Parse(format!("malformed XML in {part}: {err}"))
}

/// Reserve no more than [`PREALLOC_LIMIT`]; the size comes from the archive
/// header and is not trusted.
fn initial_capacity(declared: u64) -> usize {
    usize::try_from(declared).map_or(PREALLOC_LIMIT, |size| size.min(PREALLOC_LIMIT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::zip_bytes;

    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="https://example.com/logo.png" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn test_parse_relationships_in_order() {
        let rels = parse_relationships(RELS, "word/_rels/document.xml.rels").unwrap();
        assert_eq!(rels.len(), 3);
        assert_eq!(rels[0].id, "rId1");
        assert!(!rels[0].is_image());
        assert_eq!(rels[1].target, "media/image1.png");
        assert!(rels[1].is_image());
        assert!(rels[2].external);
        assert!(!rels[2].is_image());
    }

    #[test]
    fn test_rels_path_for() {
        assert_eq!(rels_path_for("word/document.xml"), "word/_rels/document.xml.rels");
        assert_eq!(
            rels_path_for("ppt/slides/slide3.xml"),
            "ppt/slides/_rels/slide3.xml.rels"
        );
        assert_eq!(rels_path_for("root.xml"), "_rels/root.xml.rels");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("word/document.xml", "media/image1.png"), "word/media/image1.png");
        assert_eq!(
            resolve_target("ppt/slides/slide1.xml", "../media/image2.jpeg"),
            "ppt/media/image2.jpeg"
        );
        assert_eq!(resolve_target("ppt/presentation.xml", "./slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(resolve_target("word/document.xml", "/word/media/a.png"), "word/media/a.png");
    }

    #[test]
    fn test_package_reads_parts() {
        let bytes = zip_bytes(&[
            ("word/document.xml", "\u{feff}<doc/>".as_bytes()),
            ("word/_rels/document.xml.rels", RELS.as_bytes()),
        ]);
        let mut package = Package::open(bytes).unwrap();

        assert_eq!(package.read_xml("word/document.xml").unwrap(), "<doc/>");
        assert_eq!(package.relationships("word/document.xml").unwrap().len(), 3);
        assert!(package.relationships("word/styles.xml").unwrap().is_empty());
        assert!(matches!(
            package.read_bytes("word/missing.xml"),
            Err(ExtractError::Parse(_))
        ));
    }

    #[test]
    fn test_initial_capacity_is_capped() {
        assert_eq!(initial_capacity(0), 0);
        assert_eq!(initial_capacity(4096), 4096);
        assert_eq!(initial_capacity(u64::MAX), PREALLOC_LIMIT);
        assert_eq!(initial_capacity(1 << 40), PREALLOC_LIMIT);
    }

    #[test]
    fn test_open_rejects_non_zip() {
        let result = Package::open(b"\xD0\xCF\x11\xE0legacy binary".to_vec());
        assert!(matches!(result, Err(ExtractError::Parse(_))));
    }

    #[test]
    fn test_embedded_image_request() {
        let image = EmbeddedImage {
            part: "ppt/media/image7.jpeg".to_string(),
            data: vec![0xFF, 0xD8, 0xFF, 0xE0, 0, 0],
        };
        let request = image.into_request();
        assert_eq!(request.file_name, "image7.jpeg");
        assert_eq!(request.mime_type, "image/jpeg");
    }
}
