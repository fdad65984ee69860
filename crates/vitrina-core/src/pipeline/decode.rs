//! Full image decoding with content-based format detection.

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;

use crate::error::PipelineError;
use crate::types::SupportedFormat;

use super::metadata::MetadataExtractor;

/// Result of decoding an image.
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected source format
    pub format: SupportedFormat,
    /// Image width in pixels (after orientation)
    pub width: u32,
    /// Image height in pixels (after orientation)
    pub height: u32,
}

/// Decodes upload buffers into pixels.
pub struct ImageDecoder;

impl ImageDecoder {
    /// Decode `bytes`, optionally applying the EXIF orientation.
    ///
    /// The buffer is expected to have passed validation already, so any
    /// failure here is reported as a fatal [`PipelineError::Decode`].
    pub fn decode(bytes: &[u8], auto_orient: bool) -> Result<DecodedImage, PipelineError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                message: format!("Cannot detect image format: {}", e),
            })?;

        let format = reader
            .format()
            .and_then(SupportedFormat::from_image_format)
            .ok_or_else(|| PipelineError::Decode {
                message: format!("Unsupported format: {}", format_name(reader.format())),
            })?;

        let mut image = reader.decode().map_err(|e| PipelineError::Decode {
            message: e.to_string(),
        })?;

        if auto_orient {
            if let Some(orientation) = MetadataExtractor::orientation(bytes) {
                if orientation != 1 {
                    tracing::trace!("Applying EXIF orientation {orientation}");
                    image = MetadataExtractor::apply_orientation(image, orientation);
                }
            }
        }

        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            image,
            format,
            width,
            height,
        })
    }
}

fn format_name(format: Option<ImageFormat>) -> String {
    match format {
        Some(f) => format!("{f:?}").to_lowercase(),
        None => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let bytes = png_bytes(30, 20);
        let decoded = ImageDecoder::decode(&bytes, true).unwrap();
        assert_eq!(decoded.format, SupportedFormat::Png);
        assert_eq!((decoded.width, decoded.height), (30, 20));
    }

    #[test]
    fn test_decode_garbage_is_error() {
        let err = ImageDecoder::decode(b"definitely not an image", true)
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::Decode { .. }));
    }

    #[test]
    fn test_decode_truncated_is_error() {
        let bytes = png_bytes(64, 64);
        let result = ImageDecoder::decode(&bytes[..bytes.len() / 2], false);
        assert!(result.is_err());
    }

    #[test]
    fn test_format_name() {
        assert_eq!(format_name(Some(ImageFormat::Bmp)), "bmp");
        assert_eq!(format_name(None), "unknown");
    }
}
