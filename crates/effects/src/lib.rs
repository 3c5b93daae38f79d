//! Paperanim Effects Engine
//!
//! Pure image transforms applied to a composited frame, in a fixed order:
//! - **Dark theme:** full color inversion
//! - **Highlight:** translucent rounded box around the centered match
//! - **Blur:** gaussian, vertical streak, or radial (center clear)
//! - **Chromatic aberration:** red and blue channels shifted apart
//! - **Paper texture:** low-intensity random grain
//!
//! This crate is pure computation with no I/O or shared state. Effect
//! geometry is always expressed in final-canvas pixels.

pub mod blur;
pub mod color;
pub mod highlight;
pub mod paper;

use image::RgbImage;
use paperanim_frame_model::settings::{BlurType, RenderConfiguration};
use rand::Rng;

pub use blur::VerticalKernel;
pub use highlight::HighlightBox;

/// Horizontal channel offset used by the chromatic aberration effect.
pub const CHROMATIC_OFFSET_PX: u32 = 6;

/// Blend factor of the paper grain texture.
pub const PAPER_INTENSITY: f32 = 0.08;

/// Apply every enabled effect to `image`.
///
/// `text_width`/`text_height` are the match dimensions in canvas pixels.
pub fn apply(
    image: RgbImage,
    text_width: f64,
    text_height: f64,
    config: &RenderConfiguration,
) -> RgbImage {
    apply_with_rng(image, text_width, text_height, config, &mut rand::thread_rng())
}

/// Same as [`apply`] with an explicit noise source for the paper texture.
pub fn apply_with_rng<R: Rng + ?Sized>(
    mut image: RgbImage,
    text_width: f64,
    text_height: f64,
    config: &RenderConfiguration,
    rng: &mut R,
) -> RgbImage {
    if config.is_identity() {
        return image;
    }

    if config.dark_theme() {
        color::invert(&mut image);
    }

    if config.highlight() {
        let highlight = HighlightBox::around_center(
            image.dimensions(),
            text_width,
            text_height,
            config.size_multiplier(),
        );
        highlight.draw(&mut image, highlight::highlight_color(config.dark_theme()));
    }

    image = match config.blur_type() {
        BlurType::None => image,
        BlurType::Gaussian => blur::gaussian(&image, config.blur_intensity()),
        BlurType::Vertical => blur::vertical(&image, config.blur_intensity()),
        BlurType::Radial => blur::radial(&image, config.blur_intensity()),
    };

    if config.chromatic() {
        image = color::chromatic_aberration(&image, CHROMATIC_OFFSET_PX);
    }

    if config.paper() {
        paper::apply_texture(&mut image, PAPER_INTENSITY, rng);
    }

    image
}
