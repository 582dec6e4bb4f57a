//! Image preprocessing: a fixed enhancement chain that helps tesseract.
//!
//! ```text
//! page image ──▶ grayscale ──▶ contrast ×2.0 ──▶ sharpness ×2.0 ──▶ brightness ×1.1
//! ```
//!
//! Each enhancement blends the image with a "degenerate" version of itself:
//!
//! ```text
//! out = degenerate + factor × (pixel − degenerate)      clamped to 0..=255
//! ```
//!
//! Grayscale uses the ITU-R 601-2 luma weights (`0.299 R + 0.587 G +
//! 0.114 B`) in 16-bit fixed point, not the Rec. 709 weights behind
//! [`DynamicImage::to_luma8`].
//!
//! | Step       | Degenerate image                                   |
//! |------------|----------------------------------------------------|
//! | contrast   | uniform gray at the image's mean luminance         |
//! | sharpness  | the image smoothed by a 3×3 kernel (borders kept)  |
//! | brightness | black                                              |
//!
//! A factor of 1.0 is the identity; above 1.0 pushes pixels away from the
//! degenerate image. The chain is pure integer-in/integer-out arithmetic on
//! one channel, so the same input always yields byte-identical output.

use image::{DynamicImage, GrayImage, Luma};
use tracing::debug;

pub const CONTRAST_FACTOR: f32 = 2.0;
pub const SHARPNESS_FACTOR: f32 = 2.0;
pub const BRIGHTNESS_FACTOR: f32 = 1.1;

/// Centre weight of the 3×3 smoothing kernel `[1 1 1; 1 5 1; 1 1 1] / 13`.
const SMOOTH_CENTRE: u32 = 5;
const SMOOTH_SUM: u32 = 13;

/// ITU-R 601-2 luma weights scaled by 2^16; they sum to exactly 65536.
const LUMA_R: u32 = 19_595;
const LUMA_G: u32 = 38_470;
const LUMA_B: u32 = 7_471;

/// Run the full chain. The input is left untouched.
pub fn preprocess(image: &DynamicImage) -> DynamicImage {
    let gray = to_gray_601(image);
    let gray = enhance_contrast(&gray, CONTRAST_FACTOR);
    let gray = enhance_sharpness(&gray, SHARPNESS_FACTOR);
    let gray = enhance_brightness(&gray, BRIGHTNESS_FACTOR);
    debug!("Preprocessed {}x{} page image", gray.width(), gray.height());
    DynamicImage::ImageLuma8(gray)
}

/// Collapse to one channel with the 601-2 weights. Alpha is ignored.
pub fn to_gray_601(image: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = image {
        return gray.clone();
    }
    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let luma = (r as u32 * LUMA_R + g as u32 * LUMA_G + b as u32 * LUMA_B + 0x8000) >> 16;
        Luma([luma as u8])
    })
}

/// Stretch luminance away from the mean.
pub fn enhance_contrast(image: &GrayImage, factor: f32) -> GrayImage {
    let mean = mean_luma(image);
    map_luma(image, |p| blend(mean, p, factor))
}

/// Stretch each pixel away from its smoothed neighbourhood.
pub fn enhance_sharpness(image: &GrayImage, factor: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width < 3 || height < 3 {
        return image.clone();
    }

    let mut out = image.clone();
    // Border pixels have no full neighbourhood; they stay as they are.
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let degenerate = smoothed_at(image, x, y);
            let pixel = image.get_pixel(x, y)[0];
            out.put_pixel(x, y, Luma([blend(degenerate, pixel, factor)]));
        }
    }
    out
}

/// Kernel-weighted neighbourhood mean, rounded. `(x, y)` must be interior.
fn smoothed_at(image: &GrayImage, x: u32, y: u32) -> f32 {
    // Integer sum, not a float convolution: flat regions must come back unchanged.
    let mut sum = 0u32;
    for ny in y - 1..=y + 1 {
        for nx in x - 1..=x + 1 {
            let v = image.get_pixel(nx, ny)[0] as u32;
            sum += if nx == x && ny == y { v * SMOOTH_CENTRE } else { v };
        }
    }
    ((sum + SMOOTH_SUM / 2) / SMOOTH_SUM) as f32
}

/// Scale luminance towards white.
pub fn enhance_brightness(image: &GrayImage, factor: f32) -> GrayImage {
    map_luma(image, |p| blend(0.0, p, factor))
}

fn blend(degenerate: f32, pixel: u8, factor: f32) -> u8 {
    (degenerate + factor * (pixel as f32 - degenerate)).clamp(0.0, 255.0) as u8
}

fn map_luma(image: &GrayImage, f: impl Fn(u8) -> u8) -> GrayImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel[0] = f(pixel[0]);
    }
    out
}

/// Mean luminance rounded to the nearest integer level.
fn mean_luma(image: &GrayImage) -> f32 {
    let count = image.as_raw().len();
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = image.as_raw().iter().map(|&v| v as u64).sum();
    (sum as f64 / count as f64 + 0.5).floor() as f32
}
