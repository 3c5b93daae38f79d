//! Blur variants and their intensity tables.

use image::{GrayImage, Luma, RgbImage};
use imageproc::filter::{gaussian_blur_f32, vertical_filter};
use paperanim_frame_model::settings::BlurIntensity;

/// Fraction of the max radius kept sharp by the radial blur.
const RADIAL_CLEAR_FRACTION: f64 = 0.2;

/// Slope of the radial mask ramp beyond the clear zone.
const RADIAL_RAMP: f64 = 3.0;

/// Gaussian sigma for [`BlurType::Gaussian`](paperanim_frame_model::BlurType).
pub fn gaussian_radius(intensity: BlurIntensity) -> f32 {
    match intensity {
        BlurIntensity::Low => 2.0,
        BlurIntensity::Medium => 5.0,
        BlurIntensity::High => 10.0,
    }
}

/// Gaussian sigma used for the blurred copy of the radial blur.
pub fn radial_radius(intensity: BlurIntensity) -> f32 {
    match intensity {
        BlurIntensity::Low => 4.0,
        BlurIntensity::Medium => 8.0,
        BlurIntensity::High => 15.0,
    }
}

/// Square kernel size of the vertical streak blur.
pub fn vertical_kernel_size(intensity: BlurIntensity) -> usize {
    match intensity {
        BlurIntensity::Low => 10,
        BlurIntensity::Medium => 25,
        BlurIntensity::High => 45,
    }
}

/// An `N x N` kernel whose only non-zero entries are the center column,
/// each weighted `1/N`.
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalKernel {
    size: usize,
    weights: Vec<f32>,
}

impl VerticalKernel {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let center = size / 2;
        let weight = 1.0 / size as f32;
        let mut weights = vec![0.0; size * size];
        for row in 0..size {
            weights[row * size + center] = weight;
        }
        Self { size, weights }
    }

    pub fn for_intensity(intensity: BlurIntensity) -> Self {
        Self::new(vertical_kernel_size(intensity))
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn center_column(&self) -> usize {
        self.size / 2
    }

    /// Weight at `(row, col)`; zero outside the kernel.
    pub fn weight(&self, row: usize, col: usize) -> f32 {
        if row >= self.size || col >= self.size {
            return 0.0;
        }
        self.weights[row * self.size + col]
    }

    pub fn column_sum(&self, col: usize) -> f32 {
        (0..self.size).map(|row| self.weight(row, col)).sum()
    }

    /// The kernel reduced to its only non-zero column.
    pub fn column(&self) -> Vec<f32> {
        let center = self.center_column();
        (0..self.size).map(|row| self.weight(row, center)).collect()
    }
}

pub fn gaussian(image: &RgbImage, intensity: BlurIntensity) -> RgbImage {
    gaussian_blur_f32(image, gaussian_radius(intensity))
}

/// Average along the vertical axis only, streaking while keeping
/// horizontal edges.
pub fn vertical(image: &RgbImage, intensity: BlurIntensity) -> RgbImage {
    let kernel = VerticalKernel::for_intensity(intensity);
    tracing::trace!(size = kernel.size(), "Applying vertical blur");
    vertical_filter(image, &kernel.column())
}

/// Blur everything except a clear zone around the image center.
pub fn radial(image: &RgbImage, intensity: BlurIntensity) -> RgbImage {
    let blurred = gaussian_blur_f32(image, radial_radius(intensity));
    let mask = radial_mask(image.width(), image.height());

    let mut out = image.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let m = mask.get_pixel(x, y)[0] as u32;
        if m == 0 {
            continue;
        }
        let b = blurred.get_pixel(x, y);
        for c in 0..3 {
            let mixed = (b[c] as u32 * m + px[c] as u32 * (255 - m) + 127) / 255;
            px[c] = mixed as u8;
        }
    }
    out
}

/// Blend mask for the radial blur: 0 keeps the original pixel, 255 takes
/// the blurred one.
///
/// Intensity is `clamp((d / d_max - 0.2) * 3, 0, 1)` where `d` is the
/// distance from the image center and `d_max` the center-to-corner
/// distance.
pub fn radial_mask(width: u32, height: u32) -> GrayImage {
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt();

    GrayImage::from_fn(width, height, |x, y| {
        if max_dist <= 0.0 {
            return Luma([0]);
        }
        let dx = x as f64 - cx;
        let dy = y as f64 - cy;
        let normalized = (dx * dx + dy * dy).sqrt() / max_dist;
        let level = ((normalized - RADIAL_CLEAR_FRACTION) * RADIAL_RAMP).clamp(0.0, 1.0);
        Luma([(level * 255.0) as u8])
    })
}
