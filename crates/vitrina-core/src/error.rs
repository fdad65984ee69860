//! Error types for the Vitrina ingestion pipeline.
//!
//! Validation failures are not errors here: they come back as a
//! [`ValidationResult`](crate::types::ValidationResult). The enums below cover
//! configuration problems, fatal processing failures, the watermark asset
//! (always recovered by the caller) and the storage collaborator.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Vitrina operations.
#[derive(Error, Debug)]
pub enum VitrinaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Storage collaborator errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl VitrinaError {
    /// True when the upload itself was turned away (bad or oversized input)
    /// rather than failing during processing.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Pipeline(PipelineError::InvalidImage(_) | PipelineError::UploadTooLarge { .. })
        )
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Fatal pipeline errors. Callers map these to a 500-class response, except
/// `InvalidImage` and `UploadTooLarge` which are rejections of the input.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input failed validation before processing started
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Input exceeds the upload ceiling
    #[error("Upload too large: {size_bytes} bytes > {max_bytes} bytes")]
    UploadTooLarge { size_bytes: u64, max_bytes: u64 },

    /// Image decoding failed
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// WebP encoding or the post-encode read-back failed
    #[error("Encode error: {message}")]
    Encode { message: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    /// The blocking worker panicked or was cancelled
    #[error("Processing task failed: {0}")]
    Task(String),
}

/// Failures loading the watermark logo. Never fatal to the pipeline.
#[derive(Error, Debug)]
pub enum AssetError {
    /// The logo file does not exist
    #[error("Watermark asset not found: {0}")]
    NotFound(PathBuf),

    /// The logo file exists but could not be read
    #[error("Cannot read watermark asset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The logo bytes are not a decodable image
    #[error("Cannot decode watermark asset {path}: {message}")]
    Decode { path: PathBuf, message: String },
}

/// Storage collaborator errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The path hint would escape the storage root or is empty
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Writing the object failed
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Vitrina results.
pub type Result<T> = std::result::Result<T, VitrinaError>;
