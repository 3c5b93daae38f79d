//! MuPDF document backend.
//!
//! Pages are rasterized straight into a white pixmap sized for the clip
//! region, so only the visible part of the page is ever rendered and
//! anything outside the page comes out as paper white.

use std::path::Path;

use image::RgbImage;
use mupdf::{Colorspace, Device, Document, Matrix, Page, Pixmap, Quad};
use paperanim_frame_model::geometry::{MatchRectangle, PageRect};
use paperanim_render_engine::compositor::{ComposeError, PageRaster};

use super::{DocumentBackend, DocumentPage, OpenDocument};
use crate::fault::DocumentFault;

/// Upper bound on hits returned for one page. MuPDF stops searching once
/// it is reached, so a full result means later hits were dropped.
const MAX_HITS_PER_PAGE: u32 = 4096;

#[derive(Debug, Clone, Copy, Default)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentBackend for MupdfBackend {
    type Document = MupdfDocument;

    fn open(&self, path: &Path) -> Result<MupdfDocument, DocumentFault> {
        let path_str = path.to_str().ok_or_else(|| {
            DocumentFault::Open(format!("path is not valid UTF-8: {}", path.display()))
        })?;
        let doc = Document::open(path_str).map_err(|e| DocumentFault::Open(e.to_string()))?;
        Ok(MupdfDocument { doc })
    }

    fn name(&self) -> &str {
        "mupdf"
    }
}

pub struct MupdfDocument {
    doc: Document,
}

impl OpenDocument for MupdfDocument {
    type Page = MupdfPage;

    fn is_encrypted(&self) -> bool {
        // A document whose security handler cannot be queried is not readable either.
        self.doc.needs_password().unwrap_or(true)
    }

    fn page_count(&self) -> Result<usize, DocumentFault> {
        let count = self
            .doc
            .page_count()
            .map_err(|e| DocumentFault::Open(e.to_string()))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn load_page(&self, index: usize) -> Result<MupdfPage, DocumentFault> {
        let number = index + 1;
        let raw = i32::try_from(index).map_err(|_| DocumentFault::Page {
            page: number,
            detail: "page index out of range".to_string(),
        })?;
        let page = self.doc.load_page(raw).map_err(|e| DocumentFault::Page {
            page: number,
            detail: e.to_string(),
        })?;
        Ok(MupdfPage { page, number })
    }
}

pub struct MupdfPage {
    page: Page,
    number: usize,
}

impl DocumentPage for MupdfPage {
    fn search(&self, needle: &str) -> Result<Vec<MatchRectangle>, DocumentFault> {
        let quads = self
            .page
            .search(needle, MAX_HITS_PER_PAGE)
            .map_err(|e| DocumentFault::Search {
                page: self.number,
                detail: e.to_string(),
            })?;
        if hit_limit_reached(quads.len()) {
            tracing::warn!(
                page = self.number,
                limit = MAX_HITS_PER_PAGE,
                "Search hit limit reached; later matches on this page are not included"
            );
        }
        Ok(quads.into_iter().map(|q| quad_to_match(&q)).collect())
    }
}

impl PageRaster for MupdfPage {
    fn rasterize(&self, clip: &PageRect, scale: f64) -> Result<RgbImage, ComposeError> {
        let (width, height) = raster_size(clip, scale);
        let raster_err = |e: mupdf::Error| ComposeError::Raster(e.to_string());

        let mut pixmap = Pixmap::new_with_w_h(
            &Colorspace::device_rgb(),
            width as i32,
            height as i32,
            false,
        )
        .map_err(raster_err)?;
        pixmap.clear_with(255).map_err(raster_err)?;

        {
            let device = Device::from_pixmap(&pixmap).map_err(raster_err)?;
            self.page
                .run(&device, &clip_transform(clip, scale))
                .map_err(raster_err)?;
        }

        samples_to_rgb(
            pixmap.samples(),
            pixmap.width() as usize,
            pixmap.height() as usize,
            pixmap.stride() as usize,
            pixmap.n() as usize,
        )
    }
}

/// Bounding box of a (possibly rotated) hit quad.
fn quad_to_match(q: &Quad) -> MatchRectangle {
    MatchRectangle::from_corners([
        (f64::from(q.ul.x), f64::from(q.ul.y)),
        (f64::from(q.ur.x), f64::from(q.ur.y)),
        (f64::from(q.ll.x), f64::from(q.ll.y)),
        (f64::from(q.lr.x), f64::from(q.lr.y)),
    ])
}

fn raster_size(clip: &PageRect, scale: f64) -> (u32, u32) {
    let side = |v: f64| (v * scale).round().clamp(1.0, i32::MAX as f64) as u32;
    (side(clip.width()), side(clip.height()))
}

/// Page space to pixmap space: the clip's top-left lands on the origin.
fn clip_transform(clip: &PageRect, scale: f64) -> Matrix {
    let s = scale as f32;
    Matrix::new(
        s,
        0.0,
        0.0,
        s,
        (-clip.x0 * scale) as f32,
        (-clip.y0 * scale) as f32,
    )
}

/// Pack pixmap samples (any row stride, 3+ channels) into an RGB image.
fn samples_to_rgb(
    samples: &[u8],
    width: usize,
    height: usize,
    stride: usize,
    n: usize,
) -> Result<RgbImage, ComposeError> {
    if n < 3 {
        return Err(ComposeError::Raster(format!(
            "unsupported pixmap format: {n} channels"
        )));
    }

    let row_bytes = width * n;
    if samples.len() < stride.saturating_mul(height) || row_bytes > stride {
        return Err(ComposeError::Raster("pixmap buffer size mismatch".to_string()));
    }

    let mut out = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let row_start = y * stride;
        let row = &samples[row_start..row_start + row_bytes];
        if n == 3 {
            out.extend_from_slice(row);
        } else {
            for px in row.chunks_exact(n) {
                out.extend_from_slice(&px[..3]);
            }
        }
    }

    RgbImage::from_raw(width as u32, height as u32, out).ok_or(ComposeError::EmptyRaster {
        width: width as u32,
        height: height as u32,
    })
}

fn hit_limit_reached(hits: usize) -> bool {
    hits >= MAX_HITS_PER_PAGE as usize
}
