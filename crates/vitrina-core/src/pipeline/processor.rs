//! Pipeline orchestration - wires together all processing stages.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{
    Config, ImageConfigOverrides, ImageProcessingConfig, LimitsConfig, ThumbnailConfig,
    ThumbnailOverrides, WatermarkConfig, WatermarkOverrides,
};
use crate::error::{PipelineError, Result};
use crate::types::{ProcessedImageResult, ValidationResult};

use super::decode::ImageDecoder;
use super::discovery::{DiscoveredFile, FileDiscovery};
use super::encode::encode_webp;
use super::hash::Hasher;
use super::resize::resize_to_fit;
use super::thumbnail::ThumbnailGenerator;
use super::validate::Validator;
use super::watermark::{record_skip, FileLogoSource, LogoSource, Watermarker};

/// Per-call options for [`process_image`].
///
/// Override fields left as `None` fall back to the defaults of whoever runs
/// the pipeline: the built-in defaults for the free functions, the loaded
/// config for [`ImageProcessor`].
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Composite the logo (skipped silently if the logo is unavailable)
    pub add_watermark: bool,
    pub image: ImageConfigOverrides,
    pub watermark: WatermarkOverrides,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            add_watermark: true,
            image: ImageConfigOverrides::default(),
            watermark: WatermarkOverrides::default(),
        }
    }
}

impl ProcessOptions {
    /// Options that skip the watermark stage entirely.
    pub fn without_watermark() -> Self {
        Self {
            add_watermark: false,
            ..Default::default()
        }
    }
}

/// Run the full pipeline on an already-validated upload with built-in defaults.
///
/// The logo is read from the merged `logo_path`.
pub fn process_image(bytes: &[u8], options: &ProcessOptions) -> Result<ProcessedImageResult> {
    run_pipeline(
        bytes,
        options,
        &ImageProcessingConfig::default(),
        &WatermarkConfig::default(),
        None,
    )
}

/// Like [`process_image`], with the logo supplied by the caller.
pub fn process_image_with_logo(
    bytes: &[u8],
    options: &ProcessOptions,
    logo: &dyn LogoSource,
) -> Result<ProcessedImageResult> {
    run_pipeline(
        bytes,
        options,
        &ImageProcessingConfig::default(),
        &WatermarkConfig::default(),
        Some(logo),
    )
}

/// Render a fixed-size WebP thumbnail, overrides merged over the built-in
/// thumbnail defaults.
pub fn create_thumbnail(bytes: &[u8], overrides: &ThumbnailOverrides) -> Result<Vec<u8>> {
    let config = ThumbnailConfig::default().with_overrides(overrides);
    config.validate()?;
    let auto_orient = ImageProcessingConfig::default().auto_orient;
    Ok(ThumbnailGenerator::new(config, auto_orient).generate_from_bytes(bytes)?)
}

fn run_pipeline(
    bytes: &[u8],
    options: &ProcessOptions,
    base_image: &ImageProcessingConfig,
    base_watermark: &WatermarkConfig,
    logo: Option<&dyn LogoSource>,
) -> Result<ProcessedImageResult> {
    let start = Instant::now();

    let image_config = base_image.with_overrides(&options.image);
    image_config.validate()?;
    let watermark_config = base_watermark.with_overrides(&options.watermark);
    if options.add_watermark {
        watermark_config.validate()?;
    }

    let decode_start = Instant::now();
    let decoded = ImageDecoder::decode(bytes, image_config.auto_orient)?;
    tracing::trace!("  Decode: {:?}", decode_start.elapsed());

    let resize_start = Instant::now();
    let resized = resize_to_fit(&decoded.image, &image_config);
    tracing::trace!("  Resize: {:?}", resize_start.elapsed());

    let mut watermarked = false;
    let final_image = if options.add_watermark {
        let watermark_start = Instant::now();
        let file_logo;
        let logo: &dyn LogoSource = match logo {
            Some(logo) => logo,
            None => {
                file_logo = FileLogoSource::from_config(&watermark_config);
                &file_logo
            }
        };

        let image = if logo.is_available() {
            match Watermarker::new(&watermark_config, logo).apply(&resized) {
                Some(image) => {
                    watermarked = true;
                    image
                }
                None => resized,
            }
        } else {
            record_skip(&format!("logo {} is not available", logo.describe()));
            resized
        };
        tracing::trace!("  Watermark: {:?}", watermark_start.elapsed());
        image
    } else {
        resized
    };

    let encode_start = Instant::now();
    let encoded = encode_webp(&final_image, image_config.quality)?;
    tracing::trace!("  Encode: {:?}", encode_start.elapsed());

    let content_hash = Hasher::content_hash_from_bytes(&encoded.buffer);

    tracing::debug!(
        "Processed {} {}x{} -> {}x{} webp ({} -> {} bytes) in {:?}",
        decoded.format,
        decoded.width,
        decoded.height,
        encoded.width,
        encoded.height,
        bytes.len(),
        encoded.size,
        start.elapsed()
    );

    Ok(ProcessedImageResult {
        width: encoded.width,
        height: encoded.height,
        size: encoded.size,
        mime_type: encoded.mime_type.to_string(),
        buffer: encoded.buffer,
        content_hash,
        watermarked,
    })
}

/// Application-side driver built from the loaded [`Config`].
///
/// Enforces the upload ceiling and runs the blocking pipeline off the async
/// runtime under the configured timeout.
pub struct ImageProcessor {
    image: ImageProcessingConfig,
    watermark: WatermarkConfig,
    thumbnail: ThumbnailConfig,
    limits: LimitsConfig,
    validator: Validator,
    discovery: FileDiscovery,
    logo: Option<Arc<dyn LogoSource>>,
}

impl ImageProcessor {
    /// Create a new image processor with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            image: config.image.clone(),
            watermark: config.watermark.clone(),
            thumbnail: config.thumbnail.clone(),
            limits: config.limits.clone(),
            validator: Validator::new(&config.limits, &config.image),
            discovery: FileDiscovery::new(&config.processing, &config.limits),
            logo: None,
        }
    }

    /// Use `logo` for every watermark instead of reading `logo_path`.
    pub fn with_logo_source(mut self, logo: Arc<dyn LogoSource>) -> Self {
        self.logo = Some(logo);
        self
    }

    /// Validate an upload, including the size ceiling.
    pub fn validate(&self, bytes: &[u8]) -> ValidationResult {
        self.validator.validate(bytes)
    }

    /// Validate, then process an upload on the blocking pool.
    pub async fn process(
        &self,
        bytes: Vec<u8>,
        options: &ProcessOptions,
    ) -> Result<ProcessedImageResult> {
        let max_bytes = self.limits.max_upload_bytes();
        if bytes.len() as u64 > max_bytes {
            return Err(PipelineError::UploadTooLarge {
                size_bytes: bytes.len() as u64,
                max_bytes,
            }
            .into());
        }

        let validation = self.validator.validate(&bytes);
        if !validation.valid {
            let reason = validation
                .error
                .unwrap_or_else(|| "Invalid image".to_string());
            return Err(PipelineError::InvalidImage(reason).into());
        }

        let options = options.clone();
        let image = self.image.clone();
        let watermark = self.watermark.clone();
        let logo = self.logo.clone();

        self.run_blocking("process", move || {
            run_pipeline(&bytes, &options, &image, &watermark, logo.as_deref())
        })
        .await
    }

    /// Render a thumbnail on the blocking pool, overrides merged over the
    /// configured thumbnail settings.
    pub async fn thumbnail(
        &self,
        bytes: Vec<u8>,
        overrides: &ThumbnailOverrides,
    ) -> Result<Vec<u8>> {
        let config = self.thumbnail.with_overrides(overrides);
        config.validate()?;
        let generator = ThumbnailGenerator::new(config, self.image.auto_orient);

        self.run_blocking("thumbnail", move || Ok(generator.generate_from_bytes(&bytes)?))
        .await
    }

    /// Discover all image files at a path.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        self.discovery.discover(path)
    }

    // A timed-out task keeps running on the blocking pool; only the caller
    // stops waiting for it.
    async fn run_blocking<T, F>(&self, stage: &str, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let timeout_ms = self.limits.process_timeout_ms;
        let task = tokio::task::spawn_blocking(work);

        match tokio::time::timeout(Duration::from_millis(timeout_ms), task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(PipelineError::Task(e.to_string()).into()),
            Err(_) => {
                tracing::warn!("{} timed out after {}ms", stage, timeout_ms);
                Err(PipelineError::Timeout {
                    stage: stage.to_string(),
                    timeout_ms,
                }
                .into())
            }
        }
    }
}
