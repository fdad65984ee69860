//! Vitrina Core - listing photo ingestion pipeline.
//!
//! Turns a raw upload into a web-ready asset for the listings site:
//!
//! ```text
//! Upload → Validate → Decode (+EXIF orient) → Resize → Watermark → WebP → Store
//! ```
//!
//! The pipeline functions are pure and blocking, and never persist anything.
//! Storage goes through a [`MediaStore`]. Async callers use
//! [`ImageProcessor`], which enforces the upload ceiling and the processing
//! timeout from [`Config`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use vitrina_core::{process_image, validate_image, ProcessOptions};
//!
//! let bytes = std::fs::read("salon.jpg")?;
//! let check = validate_image(&bytes);
//! if check.valid {
//!     let result = process_image(&bytes, &ProcessOptions::default())?;
//!     println!("{}x{} {} bytes", result.width, result.height, result.size);
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod storage;
pub mod types;

// Re-exports for convenient access
pub use config::{
    Config, ImageConfigOverrides, ImageProcessingConfig, ThumbnailConfig, ThumbnailOverrides,
    WatermarkConfig, WatermarkOverrides, WatermarkPosition,
};
pub use error::{AssetError, ConfigError, PipelineError, Result, StorageError, VitrinaError};
pub use output::{ReportFormat, ReportWriter, UploadRecord, UploadStatus};
pub use pipeline::{
    create_thumbnail, process_image, process_image_with_logo, watermark_skip_count,
    FileLogoSource, ImageProcessor, LogoSource, ProcessOptions, StaticLogo, Watermarker,
};
pub use storage::{LocalStore, MediaStore};
pub use types::{
    Dimensions, ProcessedImageResult, ProcessingStats, SupportedFormat, ValidationResult,
};

use pipeline::Validator;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Check an upload without decoding pixels. Never fails: problems come back
/// as `valid: false` with a reason.
pub fn validate_image(bytes: &[u8]) -> ValidationResult {
    Validator::default().validate(bytes)
}

/// Header-only width and height, or `None` if the buffer would not validate.
///
/// EXIF-rotated photos report their upright size, matching what
/// [`process_image`] decodes with the default `auto_orient`.
pub fn get_image_dimensions(bytes: &[u8]) -> Option<Dimensions> {
    Validator::default()
        .read_header(bytes)
        .ok()
        .map(|(_, dimensions)| dimensions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_validate_five_bytes() {
        let result = validate_image(b"abcde");
        assert!(!result.valid);
        assert!(result.error.is_some());
        assert!(result.format.is_none());
    }

    #[test]
    fn test_get_image_dimensions() {
        assert_eq!(
            get_image_dimensions(&png(800, 600)),
            Some(Dimensions {
                width: 800,
                height: 600
            })
        );
        assert_eq!(get_image_dimensions(b"abcde"), None);
        assert_eq!(get_image_dimensions(&[]), None);
    }

    #[test]
    fn test_validate_then_process() {
        let bytes = png(120, 90);
        let check = validate_image(&bytes);
        assert!(check.valid);
        assert_eq!(check.format, Some(SupportedFormat::Png));

        let result = process_image(&bytes, &ProcessOptions::without_watermark()).unwrap();
        assert_eq!(
            get_image_dimensions(&result.buffer),
            Some(Dimensions {
                width: 120,
                height: 90
            })
        );
    }
}
