//! Lossy WebP encoding with an authoritative read-back of the result.

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;

use crate::error::PipelineError;
use crate::types::OUTPUT_MIME_TYPE;

/// Largest width or height libwebp accepts.
pub const WEBP_MAX_DIMENSION: u32 = 16383;

/// An encoded image and the metadata read back from it.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub buffer: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub size: usize,
    pub mime_type: &'static str,
}

/// Encode `image` as lossy WebP at `quality` (0-100).
///
/// Images with an alpha channel keep it; everything else is encoded as RGB.
/// Width, height and size are read from the produced buffer, not assumed.
pub fn encode_webp(image: &DynamicImage, quality: u8) -> Result<EncodedImage, PipelineError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(PipelineError::Encode {
            message: format!("Cannot encode empty image ({width}x{height})"),
        });
    }
    if width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
        return Err(PipelineError::Encode {
            message: format!(
                "{width}x{height} exceeds the WebP limit of {WEBP_MAX_DIMENSION}px per side"
            ),
        });
    }

    let quality = quality.min(100) as f32;
    let memory = if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        webp::Encoder::from_rgba(rgba.as_raw(), width, height).encode(quality)
    } else {
        let rgb = image.to_rgb8();
        webp::Encoder::from_rgb(rgb.as_raw(), width, height).encode(quality)
    };
    let buffer = memory.to_vec();

    let (out_width, out_height) = ImageReader::with_format(Cursor::new(&buffer), ImageFormat::WebP)
        .into_dimensions()
        .map_err(|e| PipelineError::Encode {
            message: format!("Encoded WebP is unreadable: {e}"),
        })?;

    tracing::trace!(
        "  Encode: {}x{} q{} -> {} bytes",
        out_width,
        out_height,
        quality,
        buffer.len()
    );

    Ok(EncodedImage {
        size: buffer.len(),
        buffer,
        width: out_width,
        height: out_height,
        mime_type: OUTPUT_MIME_TYPE,
    })
}
