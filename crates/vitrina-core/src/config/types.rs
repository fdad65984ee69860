//! Sub-configuration structs, their defaults, and per-call override merging.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Resize and encode settings for one `process_image` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageProcessingConfig {
    /// Maximum output width in pixels
    pub max_width: u32,

    /// Maximum output height in pixels
    pub max_height: u32,

    /// WebP quality, 0-100
    pub quality: u8,

    /// Rotate/flip according to the EXIF Orientation tag before resizing
    pub auto_orient: bool,
}

impl Default for ImageProcessingConfig {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1440,
            quality: 85,
            auto_orient: true,
        }
    }
}

/// Caller-supplied partial [`ImageProcessingConfig`]. `None` keeps the base value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfigOverrides {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub quality: Option<u8>,
    pub auto_orient: Option<bool>,
}

impl ImageProcessingConfig {
    /// Return a copy with every `Some` field of `overrides` applied.
    pub fn with_overrides(&self, overrides: &ImageConfigOverrides) -> Self {
        Self {
            max_width: overrides.max_width.unwrap_or(self.max_width),
            max_height: overrides.max_height.unwrap_or(self.max_height),
            quality: overrides.quality.unwrap_or(self.quality),
            auto_orient: overrides.auto_orient.unwrap_or(self.auto_orient),
        }
    }
}

/// One of the nine anchors a watermark can be placed at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkPosition {
    Northwest,
    North,
    Northeast,
    West,
    Center,
    East,
    Southwest,
    South,
    #[default]
    Southeast,
}

/// Where an overlay sits along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisAlign {
    /// Left or top edge, offset by the margin
    Start,
    /// Centred, margin ignored
    Center,
    /// Right or bottom edge, offset by the margin
    End,
}

impl WatermarkPosition {
    /// Every anchor, row by row from the top-left.
    pub const ALL: [WatermarkPosition; 9] = [
        Self::Northwest,
        Self::North,
        Self::Northeast,
        Self::West,
        Self::Center,
        Self::East,
        Self::Southwest,
        Self::South,
        Self::Southeast,
    ];

    /// Horizontal and vertical alignment for this anchor.
    pub fn alignment(self) -> (AxisAlign, AxisAlign) {
        use AxisAlign::{Center, End, Start};
        match self {
            Self::Northwest => (Start, Start),
            Self::North => (Center, Start),
            Self::Northeast => (End, Start),
            Self::West => (Start, Center),
            Self::Center => (Center, Center),
            Self::East => (End, Center),
            Self::Southwest => (Start, End),
            Self::South => (Center, End),
            Self::Southeast => (End, End),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Northwest => "northwest",
            Self::North => "north",
            Self::Northeast => "northeast",
            Self::West => "west",
            Self::Center => "center",
            Self::East => "east",
            Self::Southwest => "southwest",
            Self::South => "south",
            Self::Southeast => "southeast",
        }
    }
}

impl fmt::Display for WatermarkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatermarkPosition {
    type Err = String;

    /// Accepts compass names and the CSS-style aliases used by the admin UI
    /// (`top-left`, `bottom-right`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "northwest" | "top-left" => Ok(Self::Northwest),
            "north" | "top" => Ok(Self::North),
            "northeast" | "top-right" => Ok(Self::Northeast),
            "west" | "left" => Ok(Self::West),
            "center" | "centre" => Ok(Self::Center),
            "east" | "right" => Ok(Self::East),
            "southwest" | "bottom-left" => Ok(Self::Southwest),
            "south" | "bottom" => Ok(Self::South),
            "southeast" | "bottom-right" => Ok(Self::Southeast),
            other => Err(format!("unknown watermark position '{other}'")),
        }
    }
}

/// Watermark settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    /// Path to the logo asset (supports `~`)
    pub logo_path: PathBuf,

    /// Watermark width as a percentage of the host width, in (0, 100]
    pub size_percent: f64,

    /// Uniform opacity applied to the logo, in [0, 1]
    pub opacity: f64,

    /// Anchor position
    pub position: WatermarkPosition,

    /// Distance from the anchored edges in pixels
    pub margin: u32,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            logo_path: PathBuf::from("assets/watermark.png"),
            size_percent: 15.0,
            opacity: 0.3,
            position: WatermarkPosition::Southeast,
            margin: 20,
        }
    }
}

/// Caller-supplied partial [`WatermarkConfig`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkOverrides {
    pub logo_path: Option<PathBuf>,
    pub size_percent: Option<f64>,
    pub opacity: Option<f64>,
    pub position: Option<WatermarkPosition>,
    pub margin: Option<u32>,
}

impl WatermarkConfig {
    /// Return a copy with every `Some` field of `overrides` applied.
    pub fn with_overrides(&self, overrides: &WatermarkOverrides) -> Self {
        Self {
            logo_path: overrides
                .logo_path
                .clone()
                .unwrap_or_else(|| self.logo_path.clone()),
            size_percent: overrides.size_percent.unwrap_or(self.size_percent),
            opacity: overrides.opacity.unwrap_or(self.opacity),
            position: overrides.position.unwrap_or(self.position),
            margin: overrides.margin.unwrap_or(self.margin),
        }
    }

    /// Logo path with `~` expanded.
    pub fn resolved_logo_path(&self) -> PathBuf {
        let path_str = self.logo_path.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }
}

/// Cover-crop thumbnail settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Exact output width in pixels
    pub width: u32,

    /// Exact output height in pixels
    pub height: u32,

    /// WebP quality, 0-100
    pub quality: u8,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 300,
            quality: 80,
        }
    }
}

/// Caller-supplied partial [`ThumbnailConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: Option<u8>,
}

impl ThumbnailConfig {
    /// Return a copy with every `Some` field of `overrides` applied.
    pub fn with_overrides(&self, overrides: &ThumbnailOverrides) -> Self {
        Self {
            width: overrides.width.unwrap_or(self.width),
            height: overrides.height.unwrap_or(self.height),
            quality: overrides.quality.unwrap_or(self.quality),
        }
    }
}

/// Limits the calling application enforces around the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Upload ceiling in megabytes, checked before validation
    pub max_upload_size_mb: u64,

    /// Upper bound on one pipeline run in milliseconds
    pub process_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_size_mb: 10,
            process_timeout_ms: 30000,
        }
    }
}

impl LimitsConfig {
    /// Upload ceiling in bytes, saturating at `u64::MAX`.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Batch processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// File extensions picked up when walking a directory
    pub supported_extensions: Vec<String>,

    /// Composite the watermark unless the caller says otherwise
    pub watermark_by_default: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_extensions: ["jpg", "jpeg", "png", "webp", "gif", "tif", "tiff", "avif"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            watermark_by_default: true,
        }
    }
}

/// Local storage collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory uploaded objects are written under
    pub root_dir: PathBuf,

    /// Public URL prefix the stored objects are served from
    pub public_base_url: String,

    /// Key prefix for processed property photos
    pub key_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("~/.vitrina/media"),
            public_base_url: "http://localhost:3000/media".to_string(),
            key_prefix: "properties".to_string(),
        }
    }
}

impl StorageConfig {
    /// Storage root with `~` expanded.
    pub fn resolved_root(&self) -> PathBuf {
        let path_str = self.root_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
