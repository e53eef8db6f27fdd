//! PowerPoint extractor.
//!
//! Slides are visited in presentation order (`p:sldIdLst`), and the
//! top-level shapes of each slide in document order. Text shapes contribute
//! their text frame; picture shapes are sent to OCR and their text is placed
//! at the picture's position within the slide. Grouped shapes are not
//! descended into.

use async_trait::async_trait;
use docread_core::{
    ContentExtractor, Document, DocumentFormat, ExtractError, ExtractedText, OcrEngine, Segment,
};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::fallback::recognize_or_skip;
use crate::ooxml::{
    EmbeddedImage, Package, Relationship, malformed, relationship_attr, resolve_target,
};

const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// Extractor for `.pptx` files.
pub struct PresentationExtractor {
    ocr: Arc<dyn OcrEngine>,
}

impl PresentationExtractor {
    #[must_use]
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self { ocr }
    }
}

#[async_trait]
impl ContentExtractor for PresentationExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Presentation
    }

    async fn extract(&self, document: &Document) -> Result<ExtractedText, ExtractError> {
        debug!("Extracting presentation: {:?}", document.path);

        let bytes = tokio::fs::read(&document.path).await?;
        let slides = tokio::task::spawn_blocking(move || read_pptx(bytes))
            .await
            .map_err(|e| ExtractError::Failed(format!("Task join error: {e}")))??;

        debug!("Found {} slide(s)", slides.len());

        let mut text = ExtractedText::new(DocumentFormat::Presentation);
        for slide in slides {
            for item in slide.items {
                match item {
                    SlideItem::Text(shape_text) => text.push(Segment::slide(slide.number, shape_text)),
                    SlideItem::Picture(image) => {
                        if let Some(image_text) =
                            recognize_or_skip(self.ocr.as_ref(), image.into_request()).await
                        {
                            text.push(Segment::image(Some(slide.number), image_text));
                        }
                    }
                }
            }
        }

        Ok(text)
    }
}

struct Slide {
    number: u32,
    items: Vec<SlideItem>,
}

enum SlideItem {
    Text(String),
    Picture(EmbeddedImage),
}

/// A shape as it appears in the slide XML.
#[derive(Debug, PartialEq, Eq)]
enum Shape {
    Text(String),
    /// Relationship id of the picture's image
    Picture(String),
}

fn read_pptx(bytes: Vec<u8>) -> Result<Vec<Slide>, ExtractError> {
    let mut package = Package::open(bytes)?;

    let presentation = package.read_xml(PRESENTATION_PART)?;
    let slide_ids = parse_slide_ids(&presentation)?;
    let presentation_rels = package.relationships(PRESENTATION_PART)?;

    let mut slides = Vec::new();
    for (index, rel_id) in slide_ids.iter().enumerate() {
        let number = u32::try_from(index + 1).unwrap_or(u32::MAX);
        let Some(rel) = find_relationship(&presentation_rels, rel_id) else {
            warn!("Slide {} references unknown relationship {}", number, rel_id);
            continue;
        };
        let part = resolve_target(PRESENTATION_PART, &rel.target);

        let xml = package.read_xml(&part)?;
        let shapes = parse_shapes(&xml, &part)?;
        let slide_rels = package.relationships(&part)?;

        let mut items = Vec::new();
        for shape in shapes {
            match shape {
                Shape::Text(text) => items.push(SlideItem::Text(text)),
                Shape::Picture(embed) => {
                    let Some(image_rel) =
                        find_relationship(&slide_rels, &embed).filter(|r| r.is_image())
                    else {
                        debug!("Picture {} on slide {} has no embedded image", embed, number);
                        continue;
                    };
                    let image_part = resolve_target(&part, &image_rel.target);
                    match package.read_bytes(&image_part) {
                        Ok(data) => items.push(SlideItem::Picture(EmbeddedImage {
                            part: image_part,
                            data,
                        })),
                        Err(e) => warn!("Skipping image {}: {}", image_part, e),
                    }
                }
            }
        }

        slides.push(Slide { number, items });
    }

    Ok(slides)
}

fn find_relationship<'a>(rels: &'a [Relationship], id: &str) -> Option<&'a Relationship> {
    rels.iter().find(|rel| rel.id == id)
}

/// Relationship ids of `p:sldIdLst`, in presentation order.
fn parse_slide_ids(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut ids = Vec::new();

    loop {
        match reader
            .read_event()
            .map_err(|e| malformed(PRESENTATION_PART, e))?
        {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sldId" => {
                if let Some(id) = relationship_attr(&e, b"id") {
                    ids.push(id);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(ids)
}

enum ShapeState {
    Text(Vec<String>),
    Picture(Option<String>),
    Other,
}

impl ShapeState {
    fn from_element(element: &BytesStart<'_>) -> Self {
        match element.local_name().as_ref() {
            b"sp" => Self::Text(Vec::new()),
            b"pic" => Self::Picture(None),
            _ => Self::Other,
        }
    }

    fn into_shape(self) -> Option<Shape> {
        match self {
            Self::Text(paragraphs) => {
                let text = paragraphs.join("\n");
                (!text.trim().is_empty()).then_some(Shape::Text(text))
            }
            Self::Picture(embed) => embed.map(Shape::Picture),
            Self::Other => None,
        }
    }

    fn paragraph(&mut self) -> Option<&mut String> {
        match self {
            Self::Text(paragraphs) => paragraphs.last_mut(),
            _ => None,
        }
    }

    fn on_element(&mut self, element: &BytesStart<'_>) {
        match (self, element.local_name().as_ref()) {
            (Self::Text(paragraphs), b"p") => paragraphs.push(String::new()),
            (Self::Picture(embed), b"blip") if embed.is_none() => {
                *embed = relationship_attr(element, b"embed");
            }
            _ => {}
        }
    }
}

/// Top-level shapes of a slide's shape tree, in document order.
fn parse_shapes(xml: &str, part: &str) -> Result<Vec<Shape>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut shapes = Vec::new();
    let mut depth = 0usize;
    let mut tree_depth: Option<usize> = None;
    let mut current: Option<ShapeState> = None;
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(|e| malformed(part, e))? {
            Event::Start(e) => {
                depth += 1;
                match tree_depth {
                    None if e.local_name().as_ref() == b"spTree" => tree_depth = Some(depth),
                    Some(tree) if depth == tree + 1 => current = Some(ShapeState::from_element(&e)),
                    Some(_) => {
                        if let Some(shape) = current.as_mut() {
                            shape.on_element(&e);
                        }
                        if e.local_name().as_ref() == b"t" {
                            in_text = true;
                        }
                    }
                    None => {}
                }
            }
            Event::Empty(e) => {
                if let Some(shape) = current.as_mut() {
                    match e.local_name().as_ref() {
                        b"br" => {
                            if let Some(paragraph) = shape.paragraph() {
                                paragraph.push('\n');
                            }
                        }
                        _ => shape.on_element(&e),
                    }
                }
            }
            Event::Text(t) if in_text => {
                if let Some(paragraph) = current.as_mut().and_then(ShapeState::paragraph) {
                    paragraph.push_str(&t.unescape().map_err(|e| malformed(part, e))?);
                }
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"t" {
                    in_text = false;
                }
                match tree_depth {
                    Some(tree) if depth == tree + 1 => {
                        if let Some(shape) = current.take().and_then(ShapeState::into_shape) {
                            shapes.push(shape);
                        }
                    }
                    Some(tree) if depth == tree => tree_depth = None,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}
