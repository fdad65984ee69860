//! Fit-inside downscaling with a single uniform scale factor.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::config::ImageProcessingConfig;

/// Compute the fit-inside dimensions for a `width × height` image.
///
/// `scale = min(max_width / width, max_height / height, 1)`, each side rounded
/// and kept within `[1, max]`. Never enlarges.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 || (width <= max_width && height <= max_height) {
        return (width, height);
    }

    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    )
    .min(1.0);

    let new_width = ((width as f64 * scale).round() as u32).clamp(1, max_width.max(1));
    let new_height = ((height as f64 * scale).round() as u32).clamp(1, max_height.max(1));
    (new_width, new_height)
}

/// Downscale `image` to fit the configured bounds.
///
/// Returns a clone when the image already fits, so the pixels are untouched.
pub fn resize_to_fit(image: &DynamicImage, config: &ImageProcessingConfig) -> DynamicImage {
    let (width, height) = image.dimensions();
    let (new_width, new_height) = fit_within(width, height, config.max_width, config.max_height);

    if (new_width, new_height) == (width, height) {
        tracing::trace!("  Resize: {}x{} already fits", width, height);
        return image.clone();
    }

    tracing::trace!(
        "  Resize: {}x{} -> {}x{}",
        width,
        height,
        new_width,
        new_height
    );
    image.resize_exact(new_width, new_height, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_ratio_hits_bounds() {
        assert_eq!(fit_within(4000, 3000, 1920, 1440), (1920, 1440));
    }

    #[test]
    fn test_wider_ratio_limited_by_width() {
        assert_eq!(fit_within(4000, 2000, 1920, 1440), (1920, 960));
    }

    #[test]
    fn test_taller_ratio_limited_by_height() {
        assert_eq!(fit_within(3000, 4000, 1920, 1440), (1080, 1440));
    }

    #[test]
    fn test_never_upscales() {
        assert_eq!(fit_within(800, 600, 1920, 1440), (800, 600));
        assert_eq!(fit_within(1920, 1440, 1920, 1440), (1920, 1440));
    }

    #[test]
    fn test_extreme_aspect_keeps_one_pixel() {
        assert_eq!(fit_within(10000, 2, 100, 100), (100, 1));
    }

    #[test]
    fn test_bounds_and_aspect_hold_across_grid() {
        let sizes = [1u32, 7, 99, 640, 1001, 1920, 3333, 8000];
        let bounds = [(1u32, 1u32), (50, 400), (320, 240), (1920, 1440), (5000, 100)];
        for &w in &sizes {
            for &h in &sizes {
                for &(max_w, max_h) in &bounds {
                    let (out_w, out_h) = fit_within(w, h, max_w, max_h);
                    assert!(out_w <= max_w && out_h <= max_h, "{w}x{h} in {max_w}x{max_h}");
                    assert!(out_w <= w && out_h <= h, "{w}x{h} upscaled");
                    assert!(out_w >= 1 && out_h >= 1);

                    // Uniform scale: each side is within rounding of the exact product
                    let scale = f64::min(max_w as f64 / w as f64, max_h as f64 / h as f64).min(1.0);
                    assert!((out_w as f64 - w as f64 * scale).abs() <= 1.0);
                    assert!((out_h as f64 - h as f64 * scale).abs() <= 1.0);
                }
            }
        }
    }

    #[test]
    fn test_resize_to_fit_resamples() {
        let img = DynamicImage::new_rgb8(400, 300);
        let config = ImageProcessingConfig {
            max_width: 200,
            max_height: 200,
            ..Default::default()
        };
        let out = resize_to_fit(&img, &config);
        assert_eq!(out.dimensions(), (200, 150));
    }

    #[test]
    fn test_resize_to_fit_passthrough() {
        let img = DynamicImage::new_rgb8(80, 60);
        let out = resize_to_fit(&img, &ImageProcessingConfig::default());
        assert_eq!(out, img);
    }
}
