//! Translucent highlighter box.

use image::{Rgb, RgbImage};

/// Corner radius of the highlight box in canvas pixels.
pub const CORNER_RADIUS_PX: f64 = 8.0;

/// Extra padding per side, as a fraction of the text dimension, added
/// when the size multiplier is above 1.0.
pub const PADDING_RATIO: f64 = 0.15;

/// Highlight opacity out of 255.
pub const HIGHLIGHT_ALPHA: u8 = 90;

/// Highlight color for the current theme.
pub fn highlight_color(dark_theme: bool) -> Rgb<u8> {
    if dark_theme {
        Rgb([0, 0, 255])
    } else {
        Rgb([255, 255, 0])
    }
}

/// Highlight rectangle in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl HighlightBox {
    /// Box centered on a canvas of `(width, height)` around a text box of
    /// `text_width x text_height`, scaled by `size_multiplier`.
    pub fn around_center(
        canvas: (u32, u32),
        text_width: f64,
        text_height: f64,
        size_multiplier: f64,
    ) -> Self {
        let cx = canvas.0 as f64 / 2.0;
        let cy = canvas.1 as f64 / 2.0;

        let mut half_w = text_width * size_multiplier / 2.0;
        let mut half_h = text_height * size_multiplier / 2.0;
        if size_multiplier > 1.0 {
            half_w += text_width * PADDING_RATIO;
            half_h += text_height * PADDING_RATIO;
        }

        Self {
            x0: cx - half_w,
            y0: cy - half_h,
            x1: cx + half_w,
            y1: cy + half_h,
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Whether the point lies inside the box with rounded corners.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        if px < self.x0 || px > self.x1 || py < self.y0 || py > self.y1 {
            return false;
        }
        let radius = CORNER_RADIUS_PX
            .min(self.width() / 2.0)
            .min(self.height() / 2.0)
            .max(0.0);
        let dx = (self.x0 + radius - px).max(px - (self.x1 - radius)).max(0.0);
        let dy = (self.y0 + radius - py).max(py - (self.y1 - radius)).max(0.0);
        dx * dx + dy * dy <= radius * radius
    }

    /// Alpha-blend `color` over every pixel whose center is inside the box.
    pub fn draw(&self, image: &mut RgbImage, color: Rgb<u8>) {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 || self.width() <= 0.0 || self.height() <= 0.0 {
            return;
        }
        let alpha = HIGHLIGHT_ALPHA as f32 / 255.0;

        let x_start = self.x0.floor().max(0.0) as u32;
        let y_start = self.y0.floor().max(0.0) as u32;
        let x_end = (self.x1.ceil().max(0.0) as u32).min(width);
        let y_end = (self.y1.ceil().max(0.0) as u32).min(height);

        for y in y_start..y_end {
            for x in x_start..x_end {
                if !self.contains(x as f64 + 0.5, y as f64 + 0.5) {
                    continue;
                }
                let px = image.get_pixel_mut(x, y);
                for c in 0..3 {
                    let blended = px[c] as f32 * (1.0 - alpha) + color[c] as f32 * alpha;
                    px[c] = blended.round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    }
}
