//! Page images read straight from a scanned PDF.
//!
//! [`LopdfRasterizer`] does not render. A scanned page is normally one
//! full-page image XObject, so the largest image drawn on the page stands in
//! for it:
//!
//! - `DCTDecode` (JPEG) and `JPXDecode` (JPEG 2000) data is sent as-is, once
//!   any general filters ahead of it (`FlateDecode`, `LZWDecode`,
//!   `ASCII85Decode`) are undone
//! - raw samples (8-bit Gray, RGB or CMYK, and 1-bit Gray or masks) are
//!   re-encoded as PNG
//!
//! A page whose largest image is in any other form (`CCITTFaxDecode`,
//! `JBIG2Decode`, indexed color, 16-bit samples) is skipped. This rasterizer
//! is the fallback for [`PdfiumRasterizer`](crate::PdfiumRasterizer), which
//! renders those pages.

use docread_core::{ExtractError, PageImage, PageRasterizer};
use image::{GrayImage, ImageFormat, RgbImage};
use lopdf::xobject::PdfImage;
use lopdf::{Dictionary, Document, Object, Stream};
use std::io::Cursor;
use tracing::{debug, warn};

/// Filters lopdf can undo on its own.
const GENERAL_FILTERS: [&str; 3] = ["FlateDecode", "LZWDecode", "ASCII85Decode"];

/// Rasterizer backed by the images embedded in each page.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfRasterizer;

impl LopdfRasterizer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PageRasterizer for LopdfRasterizer {
    fn rasterize(&self, pdf: &[u8]) -> Result<Vec<PageImage>, ExtractError> {
        let doc = Document::load_mem(pdf)
            .map_err(|e| ExtractError::Parse(format!("cannot open PDF for rasterization: {e}")))?;

        let mut pages = Vec::new();
        for (page_num, page_id) in doc.get_pages() {
            let images = match doc.get_page_images(page_id) {
                Ok(images) => images,
                Err(e) => {
                    debug!("Failed to get images from page {}: {}", page_num, e);
                    continue;
                }
            };

            let Some(largest) = images.iter().max_by_key(|image| area(image)) else {
                debug!("Page {} has no images, skipping", page_num);
                continue;
            };

            match decode_page_image(&doc, largest) {
                Ok((data, mime_type)) => pages.push(PageImage {
                    page: page_num,
                    data,
                    mime_type: mime_type.to_string(),
                }),
                Err(e) => warn!("Skipping page {}: {}", page_num, e),
            }
        }

        debug!("Rasterized {} page(s)", pages.len());
        Ok(pages)
    }
}

fn area(image: &PdfImage<'_>) -> i64 {
    image.width.saturating_mul(image.height)
}

/// Encoded bytes and MIME type for a page image.
fn decode_page_image(
    doc: &Document,
    image: &PdfImage<'_>,
) -> Result<(Vec<u8>, &'static str), String> {
    let filters = image.filters.as_deref().unwrap_or(&[]);

    let (codec, general) = match filters.split_last() {
        Some((last, rest)) if !is_general(last) => (Some(last.as_str()), rest),
        _ => (None, filters),
    };
    if let Some(filter) = general.iter().find(|f| !is_general(f)) {
        return Err(format!("unsupported filter {filter} in {filters:?}"));
    }

    let data = if general.is_empty() {
        image.content.to_vec()
    } else {
        undo_filters(image, general)?
    };

    match codec {
        None => encode_samples(doc, image, &data).map(|png| (png, "image/png")),
        Some("DCTDecode") => Ok((data, "image/jpeg")),
        Some("JPXDecode") => Ok((data, "image/jp2")),
        Some(other) => Err(format!("unsupported image filter {other}")),
    }
}

fn is_general(filter: &str) -> bool {
    GENERAL_FILTERS.contains(&filter)
}

/// Run `filters` (with the image's predictor parameters) through lopdf.
///
/// lopdf refuses to decompress image streams, so the data is decoded as a
/// plain stream carrying only the filter entries.
fn undo_filters(image: &PdfImage<'_>, filters: &[String]) -> Result<Vec<u8>, String> {
    let mut dict = Dictionary::new();
    let names: Vec<Object> = filters
        .iter()
        .map(|f| Object::Name(f.as_bytes().to_vec()))
        .collect();
    dict.set("Filter", names);
    if let Some(params) = decode_params(image.origin_dict, filters.len()) {
        dict.set("DecodeParms", params);
    }

    Stream::new(dict, image.content.to_vec())
        .decompressed_content()
        .map_err(|e| format!("cannot decode image stream: {e}"))
}

/// Parameters for the first `count` filters; lopdf applies a single set.
fn decode_params(dict: &Dictionary, count: usize) -> Option<Dictionary> {
    match dict.get(b"DecodeParms").ok()? {
        Object::Dictionary(params) => Some(params.clone()),
        Object::Array(items) => items
            .iter()
            .take(count)
            .find_map(|item| item.as_dict().ok())
            .cloned(),
        _ => None,
    }
}

/// Encode raw image samples as PNG.
///
/// The sample buffer must be exactly the size the image dictionary declares.
fn encode_samples(doc: &Document, image: &PdfImage<'_>, samples: &[u8]) -> Result<Vec<u8>, String> {
    let width = dimension(image.width)?;
    let height = dimension(image.height)?;
    let is_mask = image
        .origin_dict
        .get(b"ImageMask")
        .and_then(Object::as_bool)
        .unwrap_or(false);
    let bits = image.bits_per_component.unwrap_or(if is_mask { 1 } else { 8 });
    let channels = if is_mask {
        1
    } else {
        color_channels(doc, image.origin_dict)?
    };

    let (w, h) = (width as usize, height as usize);
    let row_bytes = match (bits, channels) {
        (8, _) => w.checked_mul(channels),
        (1, 1) => Some(w.div_ceil(8)),
        _ => {
            return Err(format!(
                "unsupported sample layout: {bits} bit(s) x {channels} channel(s)"
            ));
        }
    };
    let expected = row_bytes
        .and_then(|row| row.checked_mul(h))
        .ok_or_else(|| format!("image too large: {width}x{height}"))?;
    if samples.len() != expected {
        return Err(format!(
            "sample buffer is {} bytes, expected {expected} for {width}x{height}",
            samples.len()
        ));
    }

    let img = match channels {
        1 => {
            let mut gray = if bits == 1 {
                expand_bits(samples, w)
            } else {
                samples.to_vec()
            };
            if decode_inverted(image.origin_dict) {
                for value in &mut gray {
                    *value = 255 - *value;
                }
            }
            GrayImage::from_raw(width, height, gray).map(image::DynamicImage::ImageLuma8)
        }
        3 => RgbImage::from_raw(width, height, samples.to_vec()).map(image::DynamicImage::ImageRgb8),
        4 => RgbImage::from_raw(width, height, cmyk_to_rgb(samples))
            .map(image::DynamicImage::ImageRgb8),
        other => return Err(format!("unsupported channel count {other}")),
    };
    let img = img.ok_or_else(|| "sample buffer does not match image size".to_string())?;

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| format!("PNG encoding failed: {e}"))?;
    Ok(png)
}

fn dimension(value: i64) -> Result<u32, String> {
    u32::try_from(value)
        .ok()
        .filter(|d| *d > 0)
        .ok_or_else(|| format!("invalid image dimension {value}"))
}

/// Components per pixel of the image's color space.
fn color_channels(doc: &Document, dict: &Dictionary) -> Result<usize, String> {
    let color_space = dict
        .get(b"ColorSpace")
        .and_then(|cs| doc.dereference(cs))
        .map(|(_, cs)| cs)
        .map_err(|_| "missing color space".to_string())?;

    match color_space {
        Object::Name(name) => named_channels(name),
        Object::Array(items) => {
            let family = items
                .first()
                .and_then(|o| o.as_name().ok())
                .ok_or_else(|| "malformed color space".to_string())?;
            if family == b"ICCBased" {
                items
                    .get(1)
                    .and_then(|o| doc.dereference(o).ok())
                    .and_then(|(_, o)| o.as_stream().ok())
                    .and_then(|icc| icc.dict.get(b"N").and_then(Object::as_i64).ok())
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| "ICC profile without component count".to_string())
            } else {
                named_channels(family)
            }
        }
        _ => Err("malformed color space".to_string()),
    }
}

fn named_channels(name: &[u8]) -> Result<usize, String> {
    match name {
        b"DeviceGray" | b"G" | b"CalGray" => Ok(1),
        b"DeviceRGB" | b"RGB" | b"CalRGB" => Ok(3),
        b"DeviceCMYK" | b"CMYK" => Ok(4),
        other => Err(format!(
            "unsupported color space {}",
            String::from_utf8_lossy(other)
        )),
    }
}

/// Whether `/Decode [1 0]` flips a one-component image.
fn decode_inverted(dict: &Dictionary) -> bool {
    dict.get(b"Decode")
        .and_then(Object::as_array)
        .ok()
        .and_then(|decode| decode.first())
        .and_then(|first| first.as_float().ok())
        .is_some_and(|first| first >= 1.0)
}

/// Unpack 1-bit rows (each padded to a byte) into 8-bit gray.
fn expand_bits(packed: &[u8], width: usize) -> Vec<u8> {
    let row_bytes = width.div_ceil(8);
    let mut gray = Vec::with_capacity(packed.len() * 8);
    for row in packed.chunks_exact(row_bytes) {
        for x in 0..width {
            let bit = (row[x / 8] >> (7 - x % 8)) & 1;
            gray.push(if bit == 1 { 255 } else { 0 });
        }
    }
    gray
}

#[allow(clippy::many_single_char_names)]
fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity((cmyk.len() / 4) * 3);
    for px in cmyk.chunks_exact(4) {
        let k = 1.0 - f32::from(px[3]) / 255.0;
        for channel in &px[..3] {
            let value = 255.0 * (1.0 - f32::from(*channel) / 255.0) * k;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            rgb.push(value.round() as u8);
        }
    }
    rgb
}
