//! Brand watermark compositing.
//!
//! The logo is sized as a percentage of the host width, contain-fitted into a
//! transparent box of that size, faded with a destination-in alpha mask, and
//! composited source-over at one of nine anchors.
//!
//! Watermarking is best-effort: a missing or unreadable logo, or a host too
//! small to carry one, leaves the photo untouched. Each skip caused by the
//! asset is logged and counted (see [`watermark_skip_count`]) so a deployment
//! shipping unmarked photos shows up in monitoring.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageReader, RgbaImage};
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::{AxisAlign, WatermarkConfig, WatermarkPosition};
use crate::error::AssetError;

static WATERMARK_SKIPS: AtomicU64 = AtomicU64::new(0);

/// Number of watermark requests skipped in this process because the logo
/// asset was missing or unreadable.
pub fn watermark_skip_count() -> u64 {
    WATERMARK_SKIPS.load(Ordering::Relaxed)
}

pub(crate) fn record_skip(reason: &dyn Display) {
    WATERMARK_SKIPS.fetch_add(1, Ordering::Relaxed);
    tracing::warn!("Watermark skipped: {reason}");
}

/// Supplies the watermark logo.
pub trait LogoSource: Send + Sync {
    /// Load and decode the logo.
    fn load(&self) -> Result<DynamicImage, AssetError>;

    /// Cheap availability check. Defaults to a full load.
    fn is_available(&self) -> bool {
        self.load().is_ok()
    }

    /// Human-readable description for log lines.
    fn describe(&self) -> String;
}

/// Logo read from the filesystem on every call.
#[derive(Debug, Clone)]
pub struct FileLogoSource {
    path: PathBuf,
}

impl FileLogoSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use the (tilde-expanded) `logo_path` of a watermark config.
    pub fn from_config(config: &WatermarkConfig) -> Self {
        Self::new(config.resolved_logo_path())
    }
}

impl LogoSource for FileLogoSource {
    fn load(&self) -> Result<DynamicImage, AssetError> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AssetError::NotFound(self.path.clone())
            } else {
                AssetError::Read {
                    path: self.path.clone(),
                    source: e,
                }
            }
        })?;
        image::load_from_memory(&bytes).map_err(|e| AssetError::Decode {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Header-only read; does not decode pixels.
    fn is_available(&self) -> bool {
        ImageReader::open(&self.path)
            .and_then(|reader| reader.with_guessed_format())
            .map(|reader| reader.into_dimensions().is_ok())
            .unwrap_or(false)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Logo held in memory, e.g. bundled with the binary or built in tests.
#[derive(Debug, Clone)]
pub struct StaticLogo {
    image: Arc<DynamicImage>,
}

impl StaticLogo {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }
}

impl LogoSource for StaticLogo {
    fn load(&self) -> Result<DynamicImage, AssetError> {
        Ok(self.image.as_ref().clone())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        let (w, h) = self.image.dimensions();
        format!("in-memory logo {w}x{h}")
    }
}

/// Target watermark size: `size_percent` of the host width, height following
/// the logo's aspect ratio. Clamped to the host; `None` when either side
/// rounds to zero.
pub fn watermark_dimensions(
    host: (u32, u32),
    logo: (u32, u32),
    size_percent: f64,
) -> Option<(u32, u32)> {
    let (host_w, host_h) = host;
    let (logo_w, logo_h) = logo;
    if logo_w == 0 || logo_h == 0 {
        return None;
    }

    let width = (host_w as f64 * size_percent / 100.0).round();
    let height = (width * logo_h as f64 / logo_w as f64).round();
    let width = (width as u32).min(host_w);
    let height = (height as u32).min(host_h);

    if width == 0 || height == 0 {
        None
    } else {
        Some((width, height))
    }
}

/// Largest `(w, h)` with the source aspect that fits inside the box.
fn contain_fit(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (box_w, box_h) = target;
    let scale = f64::min(box_w as f64 / src_w as f64, box_h as f64 / src_h as f64);
    let width = ((src_w as f64 * scale).round() as u32).clamp(1, box_w);
    let height = ((src_h as f64 * scale).round() as u32).clamp(1, box_h);
    (width, height)
}

/// Scale every alpha value by `opacity` (destination-in against a flat mask).
///
/// Colour channels are untouched, so anti-aliased edges keep their shape.
pub fn apply_opacity(overlay: &mut RgbaImage, opacity: f64) {
    let mask = (opacity.clamp(0.0, 1.0) * 255.0).round() as u16;
    if mask == 255 {
        return;
    }
    for pixel in overlay.pixels_mut() {
        pixel[3] = ((pixel[3] as u16 * mask + 127) / 255) as u8;
    }
}

/// Build the `width × height` overlay: logo contain-fitted and centred on a
/// transparent canvas, then faded.
pub fn build_overlay(logo: &DynamicImage, width: u32, height: u32, opacity: f64) -> RgbaImage {
    let (fit_w, fit_h) = contain_fit(logo.dimensions(), (width, height));
    let resized = if (fit_w, fit_h) == logo.dimensions() {
        logo.to_rgba8()
    } else {
        logo.resize_exact(fit_w, fit_h, FilterType::Lanczos3)
            .to_rgba8()
    };

    let mut overlay = if (fit_w, fit_h) == (width, height) {
        resized
    } else {
        let mut canvas = RgbaImage::new(width, height);
        imageops::replace(
            &mut canvas,
            &resized,
            ((width - fit_w) / 2) as i64,
            ((height - fit_h) / 2) as i64,
        );
        canvas
    };

    apply_opacity(&mut overlay, opacity);
    overlay
}

/// Top-left corner of an `overlay`-sized box anchored on `host`.
///
/// Start-aligned axes sit `margin` from the near edge, end-aligned axes
/// `margin` from the far edge, centred axes ignore the margin. The result is
/// clamped to `[0, host - overlay]` on both axes.
pub fn placement(
    position: WatermarkPosition,
    host: (u32, u32),
    overlay: (u32, u32),
    margin: u32,
) -> (u32, u32) {
    let (horizontal, vertical) = position.alignment();
    (
        axis_offset(horizontal, host.0, overlay.0, margin),
        axis_offset(vertical, host.1, overlay.1, margin),
    )
}

fn axis_offset(align: AxisAlign, host_len: u32, overlay_len: u32, margin: u32) -> u32 {
    let free = host_len as i64 - overlay_len as i64;
    let offset = match align {
        AxisAlign::Start => margin as i64,
        AxisAlign::End => free - margin as i64,
        AxisAlign::Center => (free as f64 / 2.0).round() as i64,
    };
    offset.clamp(0, free.max(0)) as u32
}

/// Composite `overlay` source-over onto a copy of `host` at `(left, top)`.
///
/// Hosts without alpha come back without alpha.
pub fn composite(host: &DynamicImage, overlay: &RgbaImage, left: u32, top: u32) -> DynamicImage {
    let mut canvas = host.to_rgba8();
    imageops::overlay(&mut canvas, overlay, left as i64, top as i64);
    if host.color().has_alpha() {
        DynamicImage::ImageRgba8(canvas)
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
    }
}

/// Applies one watermark configuration with one logo source.
pub struct Watermarker<'a> {
    config: &'a WatermarkConfig,
    logo: &'a dyn LogoSource,
}

impl<'a> Watermarker<'a> {
    pub fn new(config: &'a WatermarkConfig, logo: &'a dyn LogoSource) -> Self {
        Self { config, logo }
    }

    /// Watermark `host`. `None` means the watermark was skipped and the
    /// caller should keep the host as is.
    pub fn apply(&self, host: &DynamicImage) -> Option<DynamicImage> {
        let (host_w, host_h) = host.dimensions();
        if host_w == 0 || host_h == 0 {
            tracing::debug!("Watermark skipped: host has no dimensions");
            return None;
        }

        let logo = match self.logo.load() {
            Ok(logo) => logo,
            Err(e) => {
                record_skip(&e);
                return None;
            }
        };

        let Some((wm_w, wm_h)) =
            watermark_dimensions((host_w, host_h), logo.dimensions(), self.config.size_percent)
        else {
            tracing::debug!(
                "Watermark skipped: {}x{} host too small for {}% logo",
                host_w,
                host_h,
                self.config.size_percent
            );
            return None;
        };

        let overlay = build_overlay(&logo, wm_w, wm_h, self.config.opacity);
        let (left, top) = placement(
            self.config.position,
            (host_w, host_h),
            (wm_w, wm_h),
            self.config.margin,
        );
        tracing::trace!(
            "  Watermark: {}x{} at ({}, {}) {}",
            wm_w,
            wm_h,
            left,
            top,
            self.config.position
        );

        Some(composite(host, &overlay, left, top))
    }
}

/// Watermark `host`, returning it unchanged if watermarking is not possible.
pub fn apply_watermark(
    host: &DynamicImage,
    config: &WatermarkConfig,
    logo: &dyn LogoSource,
) -> DynamicImage {
    Watermarker::new(config, logo)
        .apply(host)
        .unwrap_or_else(|| host.clone())
}
