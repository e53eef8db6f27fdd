//! Full-page rendering through PDFium.
//!
//! [`PdfiumRasterizer`] draws every page, so scans stored as CCITT, JBIG2,
//! indexed color or several image strips come out as one picture per page.
//! The PDFium library is loaded at runtime from `./lib/` or the system
//! search path. When neither has it, pages are read with
//! [`LopdfRasterizer`] instead.

use docread_core::{ExtractError, PageImage, PageRasterizer};
use image::{GrayImage, ImageFormat};
use pdfium_render::prelude::*;
use std::io::Cursor;
use tracing::{debug, warn};

use crate::raster::LopdfRasterizer;

/// Directory searched for a bundled PDFium before the system library.
const LIBRARY_DIR: &str = "./lib/";
/// Rendered page width in pixels.
const RENDER_WIDTH: i32 = 2000;
/// Upper bound on rendered page height in pixels.
const MAX_RENDER_HEIGHT: i32 = 4000;

/// Rasterizer that renders pages with PDFium.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumRasterizer {
    fallback: LopdfRasterizer,
}

impl PdfiumRasterizer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            fallback: LopdfRasterizer::new(),
        }
    }

    fn bind() -> Result<Pdfium, PdfiumError> {
        let bindings =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(LIBRARY_DIR))
                .or_else(|_| Pdfium::bind_to_system_library())?;
        Ok(Pdfium::new(bindings))
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf: &[u8]) -> Result<Vec<PageImage>, ExtractError> {
        match Self::bind() {
            Ok(pdfium) => render_pages(&pdfium, pdf),
            Err(e) => {
                debug!("PDFium unavailable ({}), reading embedded page images", e);
                self.fallback.rasterize(pdf)
            }
        }
    }
}

fn render_pages(pdfium: &Pdfium, pdf: &[u8]) -> Result<Vec<PageImage>, ExtractError> {
    let document = pdfium
        .load_pdf_from_byte_slice(pdf, None)
        .map_err(|e| ExtractError::Parse(format!("cannot open PDF for rendering: {e}")))?;

    let config = PdfRenderConfig::new()
        .set_target_width(RENDER_WIDTH)
        .set_maximum_height(MAX_RENDER_HEIGHT);

    let mut pages = Vec::new();
    for (index, page) in document.pages().iter().enumerate() {
        let number = u32::try_from(index + 1).unwrap_or(u32::MAX);
        let bitmap = match page.render_with_config(&config) {
            Ok(bitmap) => bitmap,
            Err(e) => {
                warn!("Skipping page {}: render failed: {}", number, e);
                continue;
            }
        };

        let png = match (u32::try_from(bitmap.width()), u32::try_from(bitmap.height())) {
            (Ok(width), Ok(height)) => bgra_to_png(width, height, &bitmap.as_raw_bytes()),
            _ => Err("negative bitmap size".to_string()),
        };
        match png {
            Ok(data) => pages.push(PageImage {
                page: number,
                data,
                mime_type: "image/png".to_string(),
            }),
            Err(e) => warn!("Skipping page {}: {}", number, e),
        }
    }

    debug!("Rendered {} page(s)", pages.len());
    Ok(pages)
}

/// Grayscale PNG from a PDFium BGRA bitmap.
pub(crate) fn bgra_to_png(width: u32, height: u32, bgra: &[u8]) -> Result<Vec<u8>, String> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(|| format!("bitmap too large: {width}x{height}"))?;
    if bgra.len() != expected {
        return Err(format!(
            "bitmap is {} bytes, expected {expected} for {width}x{height}",
            bgra.len()
        ));
    }

    let luma = bgra
        .chunks_exact(4)
        .map(|px| {
            let (b, g, r) = (u32::from(px[0]), u32::from(px[1]), u32::from(px[2]));
            ((299 * r + 587 * g + 114 * b) / 1000) as u8
        })
        .collect();
    let gray = GrayImage::from_raw(width, height, luma)
        .ok_or_else(|| "bitmap does not match its size".to_string())?;

    let mut png = Vec::new();
    image::DynamicImage::ImageLuma8(gray)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| format!("PNG encoding failed: {e}"))?;
    Ok(png)
}
