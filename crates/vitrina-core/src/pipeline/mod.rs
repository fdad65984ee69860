//! Image ingestion pipeline components.
//!
//! Stages, in the order an upload goes through them:
//! - **validate**: Magic-byte sniffing and header-only dimension read
//! - **decode**: Full decode with optional EXIF auto-orient (**metadata**)
//! - **resize**: Fit-inside downscale
//! - **watermark**: Logo overlay with graceful skip
//! - **encode**: Lossy WebP output
//! - **hash**: Content hash of the encoded bytes
//!
//! **processor** wires them together, **thumbnail** renders listing cards and
//! **discovery** finds uploads on disk for batch runs.

pub mod decode;
pub mod discovery;
pub mod encode;
pub mod hash;
pub mod metadata;
pub mod processor;
pub mod resize;
pub mod thumbnail;
pub mod validate;
pub mod watermark;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use encode::{encode_webp, EncodedImage};
pub use hash::Hasher;
pub use metadata::MetadataExtractor;
pub use processor::{
    create_thumbnail, process_image, process_image_with_logo, ImageProcessor, ProcessOptions,
};
pub use resize::{fit_within, resize_to_fit};
pub use thumbnail::ThumbnailGenerator;
pub use validate::Validator;
pub use watermark::{
    apply_watermark, watermark_skip_count, FileLogoSource, LogoSource, StaticLogo, Watermarker,
};
