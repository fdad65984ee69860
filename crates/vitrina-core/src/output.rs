//! Upload records and their JSON / JSONL serialization.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::types::ProcessedImageResult;

/// Batch report layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// One JSON array, written once the batch is done
    #[default]
    Json,
    /// One record per line, written as each upload finishes
    JsonLines,
}

/// What happened to one source file in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Stored,
    Rejected,
    Failed,
}

/// One line of a batch report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRecord {
    pub source: PathBuf,
    pub status: UploadStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,

    #[serde(default)]
    pub watermarked: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadRecord {
    /// A processed and stored upload.
    pub fn stored(source: &Path, key: String, url: String, result: &ProcessedImageResult) -> Self {
        Self {
            source: source.to_path_buf(),
            status: UploadStatus::Stored,
            url: Some(url),
            key: Some(key),
            width: Some(result.width),
            height: Some(result.height),
            size: Some(result.size),
            content_hash: Some(result.content_hash.clone()),
            watermarked: result.watermarked,
            error: None,
        }
    }

    /// An upload the validator turned away.
    pub fn rejected(source: &Path, reason: impl Into<String>) -> Self {
        Self::without_output(source, UploadStatus::Rejected, reason.into())
    }

    /// An upload that passed validation but failed later.
    pub fn failed(source: &Path, error: impl Into<String>) -> Self {
        Self::without_output(source, UploadStatus::Failed, error.into())
    }

    fn without_output(source: &Path, status: UploadStatus, error: String) -> Self {
        Self {
            source: source.to_path_buf(),
            status,
            url: None,
            key: None,
            width: None,
            height: None,
            size: None,
            content_hash: None,
            watermarked: false,
            error: Some(error),
        }
    }
}

/// Writes [`UploadRecord`]s as a batch report.
///
/// JSONL lines go out immediately so a long batch can be tailed. A JSON
/// report is held back until [`finish`](Self::finish) closes the array.
pub struct ReportWriter<W: Write> {
    writer: W,
    format: ReportFormat,
    pretty: bool,
    pending: Vec<UploadRecord>,
}

impl<W: Write> ReportWriter<W> {
    /// `pretty` only affects [`ReportFormat::Json`].
    pub fn new(writer: W, format: ReportFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            pending: Vec::new(),
        }
    }

    pub fn record(&mut self, record: UploadRecord) -> io::Result<()> {
        match self.format {
            ReportFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, &record).map_err(io::Error::other)?;
                writeln!(self.writer)
            }
            ReportFormat::Json => {
                self.pending.push(record);
                Ok(())
            }
        }
    }

    /// Write anything still held back and flush.
    pub fn finish(mut self) -> io::Result<()> {
        if self.format == ReportFormat::Json {
            let written = if self.pretty {
                serde_json::to_writer_pretty(&mut self.writer, &self.pending)
            } else {
                serde_json::to_writer(&mut self.writer, &self.pending)
            };
            written.map_err(io::Error::other)?;
            writeln!(self.writer)?;
        }
        self.writer.flush()
    }
}
