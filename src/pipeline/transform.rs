//! Geometry: fixed-rectangle crop and zoom.
//!
//! Output size is fully determined by the config: a crop of
//! `(x1, y1, x2, y2)` zoomed by `f` is
//! `round((x2-x1)·f) × round((y2-y1)·f)` pixels. Any part of the region
//! past the page edge is filled with white.

use crate::config::{BatchConfig, CropRegion};
use crate::error::FileError;
use image::imageops::FilterType;
use image::{imageops, DynamicImage, Rgba, RgbaImage};
use tracing::warn;

const PAPER_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Apply the configured crop (if any) and zoom to a rendered page.
pub fn apply(page: DynamicImage, config: &BatchConfig) -> Result<DynamicImage, FileError> {
    let cropped = match &config.crop {
        Some(region) => crop_to_region(&page, region)?,
        None => page,
    };
    if config.zoom_enabled() {
        Ok(zoom(cropped, config.zoom))
    } else {
        Ok(cropped)
    }
}

/// Crop `img` to `region`.
///
/// The result is always `region.width() × region.height()`. A region that
/// overhangs the page is padded with white past the edge; one that starts
/// outside the page is an error.
pub fn crop_to_region(img: &DynamicImage, region: &CropRegion) -> Result<DynamicImage, FileError> {
    let (width, height) = (img.width(), img.height());

    if region.x1 >= width || region.y1 >= height {
        return Err(FileError::CropOutOfBounds {
            x1: region.x1,
            y1: region.y1,
            x2: region.x2,
            y2: region.y2,
            page_width: width,
            page_height: height,
        });
    }

    let x2 = region.x2.min(width);
    let y2 = region.y2.min(height);
    let visible = img.crop_imm(region.x1, region.y1, x2 - region.x1, y2 - region.y1);
    if region.fits_within(width, height) {
        return Ok(visible);
    }

    warn!(
        "Crop region ({}) overhangs the {}x{} px page; padding with white",
        region, width, height
    );
    let mut canvas = RgbaImage::from_pixel(region.width(), region.height(), PAPER_WHITE);
    imageops::overlay(&mut canvas, &visible.to_rgba8(), 0, 0);
    Ok(DynamicImage::ImageRgba8(canvas))
}

/// Size of `width × height` scaled by `factor`, rounded, at least 1 px.
pub fn zoomed_size(width: u32, height: u32, factor: f64) -> (u32, u32) {
    let w = (width as f64 * factor).round().max(1.0) as u32;
    let h = (height as f64 * factor).round().max(1.0) as u32;
    (w, h)
}

/// Resize by `factor` with Lanczos3. A factor of 1 returns `img` untouched.
pub fn zoom(img: DynamicImage, factor: f64) -> DynamicImage {
    if (factor - 1.0).abs() <= f64::EPSILON {
        return img;
    }
    let (w, h) = zoomed_size(img.width(), img.height(), factor);
    img.resize_exact(w, h, FilterType::Lanczos3)
}
