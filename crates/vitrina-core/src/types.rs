//! Core data types passed between the pipeline and its callers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// MIME type of every processed photo.
pub const OUTPUT_MIME_TYPE: &str = "image/webp";

/// Still-image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedFormat {
    Jpeg,
    Png,
    Webp,
    Gif,
    Tiff,
    Avif,
}

impl SupportedFormat {
    /// Map a decoder format onto the accepted set. `None` for anything else.
    pub fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::WebP => Some(Self::Webp),
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::Tiff => Some(Self::Tiff),
            image::ImageFormat::Avif => Some(Self::Avif),
            _ => None,
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::Webp => image::ImageFormat::WebP,
            Self::Gif => image::ImageFormat::Gif,
            Self::Tiff => image::ImageFormat::Tiff,
            Self::Avif => image::ImageFormat::Avif,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
            Self::Tiff => "tiff",
            Self::Avif => "avif",
        }
    }
}

impl fmt::Display for SupportedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Outcome of validating an upload.
///
/// Consumed immediately by whoever called the validator; `valid == false`
/// carries a human-readable `error` and no metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<SupportedFormat>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn ok(format: SupportedFormat, dimensions: Dimensions) -> Self {
        Self {
            valid: true,
            format: Some(format),
            width: Some(dimensions.width),
            height: Some(dimensions.height),
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            format: None,
            width: None,
            height: None,
            error: Some(error.into()),
        }
    }

    /// Dimensions, when validation passed.
    pub fn dimensions(&self) -> Option<Dimensions> {
        match (self.valid, self.width, self.height) {
            (true, Some(width), Some(height)) => Some(Dimensions { width, height }),
            _ => None,
        }
    }
}

/// The encoded photo handed back to the caller, who owns persisting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedImageResult {
    /// Final WebP bytes
    #[serde(skip)]
    pub buffer: Vec<u8>,

    /// Width read back from the encoded buffer
    pub width: u32,

    /// Height read back from the encoded buffer
    pub height: u32,

    /// Byte length of `buffer`
    pub size: usize,

    /// Always [`OUTPUT_MIME_TYPE`]
    pub mime_type: String,

    /// BLAKE3 hex digest of `buffer`
    pub content_hash: String,

    /// Whether a logo was actually composited
    pub watermarked: bool,
}

impl ProcessedImageResult {
    /// Content-addressed storage key, e.g. `properties/9f86d081884c7d65.webp`.
    pub fn storage_key(&self, prefix: &str) -> String {
        let short = &self.content_hash[..self.content_hash.len().min(16)];
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("{short}.webp")
        } else {
            format!("{prefix}/{short}.webp")
        }
    }
}

/// Statistics for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProcessingStats {
    /// Uploads processed and stored
    pub succeeded: usize,

    /// Uploads that failed processing or storage
    pub failed: usize,

    /// Uploads rejected by the validator
    pub rejected: usize,

    /// Processed uploads that went out without a watermark they asked for
    pub watermark_skipped: usize,

    /// Total bytes read
    pub bytes_in: u64,

    /// Total bytes written
    pub bytes_out: u64,

    /// Total processing time in seconds
    pub total_seconds: f64,
}
