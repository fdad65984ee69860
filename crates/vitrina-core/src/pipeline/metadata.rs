//! EXIF orientation handling for camera and phone uploads.

use exif::{In, Reader, Tag, Value};
use image::DynamicImage;
use std::io::Cursor;

/// Reads the EXIF Orientation tag and applies it to decoded pixels.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Read the EXIF Orientation (1-8) from an in-memory upload.
    ///
    /// Returns `None` if the buffer has no EXIF block or no orientation tag.
    pub fn orientation(bytes: &[u8]) -> Option<u32> {
        let mut cursor = Cursor::new(bytes);
        let exif = Reader::new().read_from_container(&mut cursor).ok()?;
        exif.get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|f| match &f.value {
                Value::Short(v) => v.first().map(|&x| x as u32),
                Value::Long(v) => v.first().copied(),
                _ => None,
            })
            .filter(|o| (1..=8).contains(o))
    }

    /// Rotate/flip `image` so it displays upright for the given orientation.
    pub fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
        match orientation {
            2 => image.fliph(),
            3 => image.rotate180(),
            4 => image.flipv(),
            5 => image.rotate90().fliph(),
            6 => image.rotate90(),
            7 => image.rotate270().fliph(),
            8 => image.rotate270(),
            _ => image,
        }
    }
}

/// Test helpers for uploads carrying EXIF.
#[cfg(test)]
pub(crate) mod fixtures {
    /// Insert a big-endian APP1 Exif segment holding only `orientation`
    /// right after the SOI marker of a JPEG.
    pub(crate) fn with_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
        let mut payload = b"Exif\0\0MM\0\x2a\0\0\0\x08".to_vec();
        payload.extend_from_slice(&1u16.to_be_bytes());
        payload.extend_from_slice(&0x0112u16.to_be_bytes());
        payload.extend_from_slice(&3u16.to_be_bytes());
        payload.extend_from_slice(&1u32.to_be_bytes());
        payload.extend_from_slice(&orientation.to_be_bytes());
        payload.extend_from_slice(&[0, 0]);
        payload.extend_from_slice(&0u32.to_be_bytes());

        let mut out = jpeg[..2].to_vec();
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        out.extend_from_slice(&payload);
        out.extend_from_slice(&jpeg[2..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::with_orientation;
    use super::*;
    use image::{GenericImageView, ImageFormat, Rgb, RgbImage};

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut out, ImageFormat::Jpeg)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_orientation_missing_exif() {
        assert_eq!(MetadataExtractor::orientation(b"not an image"), None);
        assert_eq!(MetadataExtractor::orientation(&jpeg(8, 8)), None);
    }

    #[test]
    fn test_orientation_read_from_jpeg() {
        let bytes = jpeg(40, 30);
        assert_eq!(MetadataExtractor::orientation(&with_orientation(&bytes, 6)), Some(6));
        assert_eq!(MetadataExtractor::orientation(&with_orientation(&bytes, 1)), Some(1));
        // Out-of-range values are ignored
        assert_eq!(MetadataExtractor::orientation(&with_orientation(&bytes, 9)), None);
    }

    #[test]
    fn test_rotation_swaps_dimensions() {
        let img = DynamicImage::new_rgb8(40, 30);
        for orientation in [5, 6, 7, 8] {
            let out = MetadataExtractor::apply_orientation(img.clone(), orientation);
            assert_eq!(out.dimensions(), (30, 40), "orientation {orientation}");
        }
        for orientation in [1, 2, 3, 4, 99] {
            let out = MetadataExtractor::apply_orientation(img.clone(), orientation);
            assert_eq!(out.dimensions(), (40, 30), "orientation {orientation}");
        }
    }

    #[test]
    fn test_orientation_6_moves_top_left_to_top_right() {
        let mut img = RgbImage::new(4, 2);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        let out = MetadataExtractor::apply_orientation(DynamicImage::ImageRgb8(img), 6);
        let out = out.to_rgb8();
        assert_eq!(out.get_pixel(1, 0), &Rgb([255, 0, 0]));
    }
}
