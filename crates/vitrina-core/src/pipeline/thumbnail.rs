//! Fixed-size cover-crop thumbnails with WebP output.

use image::imageops::FilterType;
use image::DynamicImage;

use crate::config::ThumbnailConfig;
use crate::error::PipelineError;

use super::decode::ImageDecoder;
use super::encode::encode_webp;

/// Generates listing-card thumbnails.
pub struct ThumbnailGenerator {
    config: ThumbnailConfig,
    auto_orient: bool,
}

impl ThumbnailGenerator {
    /// Create a thumbnail generator. `auto_orient` follows `image.auto_orient`
    /// so cards and full-size photos are rotated the same way.
    pub fn new(config: ThumbnailConfig, auto_orient: bool) -> Self {
        Self {
            config,
            auto_orient,
        }
    }

    /// Cover-crop `image` to exactly `width × height` and encode it as WebP.
    ///
    /// Unlike the main pipeline this may enlarge small images, since the card
    /// size is fixed.
    pub fn generate(&self, image: &DynamicImage) -> Result<Vec<u8>, PipelineError> {
        let thumbnail =
            image.resize_to_fill(self.config.width, self.config.height, FilterType::Lanczos3);
        let encoded = encode_webp(&thumbnail, self.config.quality)?;
        Ok(encoded.buffer)
    }

    /// Decode an upload buffer, then [`generate`](Self::generate).
    pub fn generate_from_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>, PipelineError> {
        let decoded = ImageDecoder::decode(bytes, self.auto_orient)?;
        self.generate(&decoded.image)
    }
}
