//! Per-channel color transforms.

use image::{imageops, RgbImage};

/// Replace every channel value `v` with `255 - v`.
pub fn invert(image: &mut RgbImage) {
    imageops::invert(image);
}

/// Shift the red channel left and the blue channel right by `offset`
/// pixels, wrapping around the row. Green stays in place.
pub fn chromatic_aberration(image: &RgbImage, offset: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }
    let offset = offset % width;

    RgbImage::from_fn(width, height, |x, y| {
        let red_src = (x + offset) % width;
        let blue_src = (x + width - offset) % width;
        let mut px = *image.get_pixel(x, y);
        px[0] = image.get_pixel(red_src, y)[0];
        px[2] = image.get_pixel(blue_src, y)[2];
        px
    })
}
