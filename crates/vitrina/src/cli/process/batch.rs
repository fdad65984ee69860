//! Batch processing: per-file validate, process and store with progress and a report.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

use vitrina_core::pipeline::DiscoveredFile;
use vitrina_core::{MediaStore, ProcessingStats, ReportWriter, UploadRecord};

use super::{ProcessArgs, ProcessContext};

/// Process every discovered file in order and write the report.
pub async fn process_batch(
    ctx: &ProcessContext,
    args: &ProcessArgs,
    files: Vec<DiscoveredFile>,
) -> anyhow::Result<ProcessingStats> {
    let progress = create_progress_bar(files.len() as u64);
    let start_time = Instant::now();
    let mut stats = ProcessingStats::default();

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut report = ReportWriter::new(sink, args.format.into(), args.output.is_none());

    for file in &files {
        let record = process_one(ctx, file, &mut stats).await;
        report.record(record)?;

        progress.inc(1);
        let elapsed = start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let done = stats.succeeded + stats.failed + stats.rejected;
            progress.set_message(format!("{:.1} img/sec", done as f64 / elapsed));
        }
    }

    report.finish()?;
    if let Some(path) = &args.output {
        tracing::info!("Report written to {:?}", path);
    }

    stats.total_seconds = start_time.elapsed().as_secs_f64();
    progress.finish_and_clear();
    print_summary(&stats);

    Ok(stats)
}

/// Run one file through process and store, updating `stats`.
///
/// Validation happens inside [`ImageProcessor::process`](vitrina_core::ImageProcessor::process);
/// its rejections are reported as such, everything else as a failure.
async fn process_one(
    ctx: &ProcessContext,
    file: &DiscoveredFile,
    stats: &mut ProcessingStats,
) -> UploadRecord {
    if let Some(reason) = &file.rejection {
        stats.rejected += 1;
        return UploadRecord::rejected(&file.path, reason.clone());
    }

    let bytes = match tokio::fs::read(&file.path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            stats.failed += 1;
            tracing::error!("Failed: {:?} - {}", file.path, e);
            return UploadRecord::failed(&file.path, format!("Cannot read file: {e}"));
        }
    };
    stats.bytes_in += bytes.len() as u64;

    let result = match ctx.processor.process(bytes, &ctx.options).await {
        Ok(result) => result,
        Err(e) if e.is_rejection() => {
            stats.rejected += 1;
            tracing::warn!("Rejected: {:?} - {}", file.path, e);
            return UploadRecord::rejected(&file.path, e.to_string());
        }
        Err(e) => {
            stats.failed += 1;
            tracing::error!("Failed: {:?} - {}", file.path, e);
            return UploadRecord::failed(&file.path, e.to_string());
        }
    };

    let key = result.storage_key(&ctx.key_prefix);
    match ctx.store.put(&key, &result.buffer, &result.mime_type) {
        Ok(url) => {
            stats.succeeded += 1;
            stats.bytes_out += result.size as u64;
            if ctx.options.add_watermark && !result.watermarked {
                stats.watermark_skipped += 1;
            }
            tracing::debug!("Stored {:?} as {}", file.path, url);
            UploadRecord::stored(&file.path, key, url, &result)
        }
        Err(e) => {
            stats.failed += 1;
            tracing::error!("Failed to store {:?} - {}", file.path, e);
            UploadRecord::failed(&file.path, e.to_string())
        }
    }
}

/// Create a progress bar for batch processing.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .map(|style| style.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after batch processing.
fn print_summary(stats: &ProcessingStats) {
    let total = stats.succeeded + stats.failed + stats.rejected;
    let rate = if stats.total_seconds > 0.0 {
        total as f64 / stats.total_seconds
    } else {
        0.0
    };
    let saved = if stats.bytes_in > 0 {
        100.0 - (stats.bytes_out as f64 / stats.bytes_in as f64) * 100.0
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Stored:       {:>8}", stats.succeeded);
    if stats.rejected > 0 {
        eprintln!("    Rejected:     {:>8}", stats.rejected);
    }
    if stats.failed > 0 {
        eprintln!("    Failed:       {:>8}", stats.failed);
    }
    if stats.watermark_skipped > 0 {
        eprintln!("    No watermark: {:>8}", stats.watermark_skipped);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", total);
    eprintln!("    Duration:     {:>7.1}s", stats.total_seconds);
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("    Size saved:   {:>7.1}%", saved);
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::process::setup::setup_processor;
    use crate::cli::process::OutputFormat;
    use image::{DynamicImage, ImageFormat};
    use std::path::Path;
    use vitrina_core::{Config, UploadStatus};

    fn save_png(path: &Path, width: u32, height: u32) {
        DynamicImage::new_rgb8(width, height)
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    }

    #[tokio::test]
    async fn test_batch_stores_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("piso");
        std::fs::create_dir(&input).unwrap();
        save_png(&input.join("a-salon.png"), 2400, 1200);
        save_png(&input.join("b-cocina.png"), 300, 200);
        std::fs::write(input.join("c-roto.jpg"), b"abcde").unwrap();
        std::fs::write(input.join("d-enorme.jpg"), vec![0xFFu8; 1024 * 1024 + 1]).unwrap();

        let report = dir.path().join("report.jsonl");
        let args = ProcessArgs {
            input: input.clone(),
            out_dir: Some(dir.path().join("media")),
            base_url: Some("https://cdn.example/media".to_string()),
            output: Some(report.clone()),
            format: OutputFormat::Jsonl,
            logo: Some(dir.path().join("no-logo.png")),
            ..Default::default()
        };
        let mut config = Config::default();
        config.limits.max_upload_size_mb = 1;
        let ctx = setup_processor(&args, config).unwrap();
        let files = ctx.processor.discover(&input);
        assert_eq!(files.len(), 4);

        let stats = process_batch(&ctx, &args, files).await.unwrap();
        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.rejected, 2);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.watermark_skipped, 2);

        let content = std::fs::read_to_string(&report).unwrap();
        let records: Vec<UploadRecord> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(records.len(), 4);

        let first = &records[0];
        assert_eq!(first.status, UploadStatus::Stored);
        assert_eq!((first.width, first.height), (Some(1920), Some(960)));
        let key = first.key.as_ref().unwrap();
        assert!(key.starts_with("properties/") && key.ends_with(".webp"));
        assert_eq!(
            first.url.as_deref(),
            Some(format!("https://cdn.example/media/{key}").as_str())
        );
        assert!(dir.path().join("media").join(key).exists());

        assert_eq!(records[2].status, UploadStatus::Rejected);
        assert!(records[2].error.as_deref().unwrap().starts_with("Invalid image"));
        assert_eq!(records[3].status, UploadStatus::Rejected);
        assert!(records[3].error.as_deref().unwrap().contains("too large"));
    }
}
