//! Frame compositor: turns one text match into one finished frame.
//!
//! ```text
//! match rect ── view rect (4x text width, canvas aspect)
//!                   │
//!                   ├── rasterize at dpi_scale = canvas_w / view_w
//!                   │
//!                   ├── Lanczos resize to exact canvas size
//!                   │
//!                   └── effects (text box in canvas pixels)
//! ```

use image::imageops::{self, FilterType};
use image::RgbImage;
use paperanim_frame_model::frame::Frame;
use paperanim_frame_model::geometry::{MatchRectangle, PageRect};
use paperanim_frame_model::settings::{Orientation, RenderConfiguration};

/// View width as a multiple of the text width.
pub const ZOOM_FACTOR: f64 = 4.0;

/// The height-driven fallback kicks in when the view would be shorter
/// than this multiple of the text height.
pub const MIN_VIEW_HEIGHT_RATIO: f64 = 1.5;

/// View height as a multiple of the text height when the fallback applies.
pub const FALLBACK_VIEW_HEIGHT_RATIO: f64 = 2.0;

/// Errors producing a single frame.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComposeError {
    #[error("match has no usable area ({width}x{height})")]
    DegenerateMatch { width: f64, height: f64 },

    #[error("rasterization failed: {0}")]
    Raster(String),

    #[error("rasterizer returned an empty image ({width}x{height})")]
    EmptyRaster { width: u32, height: u32 },
}

/// A page that can render a clipped region of itself.
pub trait PageRaster {
    /// Render `clip` (page coordinates) magnified by `scale` into an RGB
    /// image of roughly `clip.width() * scale` by `clip.height() * scale`
    /// pixels. Regions outside the page are filled with white.
    fn rasterize(&self, clip: &PageRect, scale: f64) -> Result<RgbImage, ComposeError>;
}

/// Crop geometry for one match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropPlan {
    /// Output canvas size in pixels.
    pub canvas: (u32, u32),
    /// Page-space region to rasterize, centered on the match.
    pub view: PageRect,
    /// Page units to canvas pixels.
    pub dpi_scale: f64,
    /// Match width in canvas pixels.
    pub scaled_text_width: f64,
    /// Match height in canvas pixels.
    pub scaled_text_height: f64,
    /// Whether the view was sized from the text height.
    pub height_fallback: bool,
}

impl CropPlan {
    pub fn compute(
        matched: &MatchRectangle,
        orientation: Orientation,
    ) -> Result<CropPlan, ComposeError> {
        let text_width = matched.width();
        let text_height = matched.height();
        if matched.rect().is_degenerate() {
            return Err(ComposeError::DegenerateMatch {
                width: text_width,
                height: text_height,
            });
        }

        let canvas = orientation.canvas_size();
        let aspect_ratio = orientation.aspect_ratio();

        let mut view_width = text_width * ZOOM_FACTOR;
        let mut view_height = view_width / aspect_ratio;
        let height_fallback = view_height < text_height * MIN_VIEW_HEIGHT_RATIO;
        if height_fallback {
            view_height = text_height * FALLBACK_VIEW_HEIGHT_RATIO;
            view_width = view_height * aspect_ratio;
        }

        let (cx, cy) = matched.center();
        let view = PageRect::centered(cx, cy, view_width, view_height);
        let dpi_scale = canvas.0 as f64 / view_width;

        Ok(CropPlan {
            canvas,
            view,
            dpi_scale,
            scaled_text_width: text_width * dpi_scale,
            scaled_text_height: text_height * dpi_scale,
            height_fallback,
        })
    }
}

/// Rasterize the planned view and resize it to the exact canvas size.
pub fn render_crop<P: PageRaster + ?Sized>(
    page: &P,
    plan: &CropPlan,
) -> Result<RgbImage, ComposeError> {
    let raster = page.rasterize(&plan.view, plan.dpi_scale)?;
    let (width, height) = raster.dimensions();
    if width == 0 || height == 0 {
        return Err(ComposeError::EmptyRaster { width, height });
    }

    let (target_w, target_h) = plan.canvas;
    if (width, height) == (target_w, target_h) {
        return Ok(raster);
    }
    tracing::trace!(
        raster_w = width,
        raster_h = height,
        target_w,
        target_h,
        "Resizing raster to canvas"
    );
    Ok(imageops::resize(&raster, target_w, target_h, FilterType::Lanczos3))
}

/// Compose one frame for `matched` on `page`.
pub fn compose<P: PageRaster + ?Sized>(
    page: &P,
    matched: &MatchRectangle,
    config: &RenderConfiguration,
) -> Result<Frame, ComposeError> {
    let plan = CropPlan::compute(matched, config.orientation())?;
    let crop = render_crop(page, &plan)?;
    let image = paperanim_effects::apply(
        crop,
        plan.scaled_text_width,
        plan.scaled_text_height,
        config,
    );
    Ok(Frame::new(image))
}
