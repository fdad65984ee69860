//! Upload validation: signature sniffing plus a header-only dimension read.
//!
//! Nothing here decodes pixel data, so rejecting garbage stays cheap. Every
//! failure is reported through [`ValidationResult::invalid`]; malformed input
//! never produces an `Err` or a panic.
//!
//! Reported dimensions are the ones the pipeline will see: with auto-orient
//! on, EXIF orientations 5-8 swap width and height.

use image::ImageReader;
use std::io::Cursor;

use crate::config::{ImageProcessingConfig, LimitsConfig};
use crate::types::{Dimensions, SupportedFormat, ValidationResult};

use super::metadata::MetadataExtractor;

/// Validates upload buffers before processing.
#[derive(Debug, Clone)]
pub struct Validator {
    max_upload_bytes: Option<u64>,
    auto_orient: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            max_upload_bytes: None,
            auto_orient: ImageProcessingConfig::default().auto_orient,
        }
    }
}

impl Validator {
    /// Create a validator that enforces the configured upload ceiling and
    /// reports dimensions the way `image` will decode them.
    pub fn new(limits: &LimitsConfig, image: &ImageProcessingConfig) -> Self {
        Self {
            max_upload_bytes: Some(limits.max_upload_bytes()),
            auto_orient: image.auto_orient,
        }
    }

    /// Validate a raw upload buffer.
    ///
    /// Checks:
    /// - Buffer is non-empty and within the upload ceiling (if any)
    /// - Signature belongs to a supported still-image format that this build
    ///   can decode
    /// - Header parses and reports non-zero dimensions
    pub fn validate(&self, bytes: &[u8]) -> ValidationResult {
        if let Some(max) = self.max_upload_bytes {
            if bytes.len() as u64 > max {
                return ValidationResult::invalid(too_large(bytes.len() as u64, max));
            }
        }

        match self.read_header(bytes) {
            Ok((format, dimensions)) => {
                tracing::trace!(
                    "Validated {} {}x{}",
                    format,
                    dimensions.width,
                    dimensions.height
                );
                ValidationResult::ok(format, dimensions)
            }
            Err(reason) => {
                tracing::debug!("Rejected upload: {reason}");
                ValidationResult::invalid(reason)
            }
        }
    }

    /// Identify the format and read dimensions from the header.
    pub fn read_header(&self, bytes: &[u8]) -> Result<(SupportedFormat, Dimensions), String> {
        if bytes.is_empty() {
            return Err("Empty buffer".to_string());
        }
        if bytes.len() < 4 {
            return Err("File too small to be a valid image".to_string());
        }

        let format = match Self::sniff_format(bytes) {
            Some(format) => format,
            None => {
                // Recognisable but not accepted (BMP, ICO, ...) gets a clearer message
                return Err(match image::guess_format(bytes) {
                    Ok(other) => format!("Unsupported image format: {other:?}"),
                    Err(_) => "Unrecognized image format (invalid magic bytes)".to_string(),
                });
            }
        };

        let mut dimensions = Self::read_dimensions(bytes, format)?;
        if dimensions.width == 0 || dimensions.height == 0 {
            return Err(format!(
                "Image has zero dimensions ({}x{})",
                dimensions.width, dimensions.height
            ));
        }

        if self.auto_orient && matches!(MetadataExtractor::orientation(bytes), Some(5..=8)) {
            dimensions = Dimensions {
                width: dimensions.height,
                height: dimensions.width,
            };
        }
        Ok((format, dimensions))
    }

    /// Read dimensions from the header of an already-sniffed buffer.
    fn read_dimensions(bytes: &[u8], format: SupportedFormat) -> Result<Dimensions, String> {
        if format == SupportedFormat::Avif {
            return avif_header_dimensions(bytes);
        }
        let reader = ImageReader::with_format(Cursor::new(bytes), format.image_format());
        match reader.into_dimensions() {
            Ok((width, height)) => Ok(Dimensions { width, height }),
            Err(e) => Err(format!("Corrupt or unreadable {format} header: {e}")),
        }
    }

    /// Match the buffer's leading bytes against supported signatures.
    fn sniff_format(header: &[u8]) -> Option<SupportedFormat> {
        // JPEG: FF D8 FF
        if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(SupportedFormat::Jpeg);
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if header.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(SupportedFormat::Png);
        }

        // GIF: GIF87a or GIF89a
        if header.starts_with(b"GIF87a") || header.starts_with(b"GIF89a") {
            return Some(SupportedFormat::Gif);
        }

        // WebP: RIFF....WEBP
        if header.len() >= 12 && &header[0..4] == b"RIFF" && &header[8..12] == b"WEBP" {
            return Some(SupportedFormat::Webp);
        }

        // TIFF: II (little-endian) or MM (big-endian) followed by version 42
        if header.starts_with(&[b'I', b'I', 0x2A, 0x00])
            || header.starts_with(&[b'M', b'M', 0x00, 0x2A])
        {
            return Some(SupportedFormat::Tiff);
        }

        // AVIF: ftyp box at offset 4 with an avif/avis major brand
        if header.len() >= 12
            && &header[4..8] == b"ftyp"
            && (&header[8..12] == b"avif" || &header[8..12] == b"avis")
        {
            return Some(SupportedFormat::Avif);
        }

        None
    }
}

/// Rejection reason for an upload over the ceiling.
pub(crate) fn too_large(size_bytes: u64, max_bytes: u64) -> String {
    format!("File too large ({size_bytes} bytes, limit {max_bytes} bytes)")
}

// Only formats the pipeline can decode pass validation
#[cfg(not(feature = "avif-decode"))]
fn avif_header_dimensions(_bytes: &[u8]) -> Result<Dimensions, String> {
    Err("AVIF decoding not available".to_string())
}

#[cfg(feature = "avif-decode")]
fn avif_header_dimensions(bytes: &[u8]) -> Result<Dimensions, String> {
    avif_dimensions(bytes)
        .ok_or_else(|| "Corrupt or unreadable avif header: no ispe property".to_string())
}

/// Read `(width, height)` from the first `ispe` property of an AVIF container.
///
/// Path: top-level `meta` (full box) → `iprp` → `ipco` → `ispe` (full box,
/// then two big-endian u32s). Reading the container keeps validation
/// header-only; the AVIF decoder would decode the whole primary item.
#[cfg(feature = "avif-decode")]
fn avif_dimensions(bytes: &[u8]) -> Option<Dimensions> {
    let meta = find_box(bytes, b"meta")?;
    // meta is a full box: skip version + flags
    let iprp = find_box(meta.get(4..)?, b"iprp")?;
    let ipco = find_box(iprp, b"ipco")?;
    let ispe = find_box(ipco, b"ispe")?;
    let width = u32::from_be_bytes(ispe.get(4..8)?.try_into().ok()?);
    let height = u32::from_be_bytes(ispe.get(8..12)?.try_into().ok()?);
    Some(Dimensions { width, height })
}

/// Return the payload of the first box of type `kind` among `data`'s children.
#[cfg(feature = "avif-decode")]
fn find_box<'a>(mut data: &'a [u8], kind: &[u8; 4]) -> Option<&'a [u8]> {
    while data.len() >= 8 {
        let size = u32::from_be_bytes(data[0..4].try_into().ok()?) as u64;
        let box_type = &data[4..8];
        let (header_len, total_len) = match size {
            // Box extends to the end of the enclosing data
            0 => (8u64, data.len() as u64),
            // 64-bit largesize follows the type
            1 => {
                let large = u64::from_be_bytes(data.get(8..16)?.try_into().ok()?);
                (16, large)
            }
            n => (8, n),
        };
        if total_len < header_len || total_len > data.len() as u64 {
            return None;
        }
        let (header_len, total_len) = (header_len as usize, total_len as usize);
        if box_type == kind {
            return Some(&data[header_len..total_len]);
        }
        data = &data[total_len..];
    }
    None
}
