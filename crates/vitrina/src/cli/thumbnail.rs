//! The `vitrina thumbnail` command.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use vitrina_core::{Config, ImageProcessor, ThumbnailOverrides};

/// Arguments for the `thumbnail` command.
#[derive(Args, Debug)]
pub struct ThumbnailArgs {
    /// Source image
    pub input: PathBuf,

    /// Where to write the WebP thumbnail
    #[arg(short, long)]
    pub output: PathBuf,

    /// Width in pixels (config default: 400)
    #[arg(long)]
    pub width: Option<u32>,

    /// Height in pixels (config default: 300)
    #[arg(long)]
    pub height: Option<u32>,

    /// WebP quality 0-100 (config default: 80)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: Option<u8>,
}

impl ThumbnailArgs {
    fn overrides(&self) -> ThumbnailOverrides {
        ThumbnailOverrides {
            width: self.width,
            height: self.height,
            quality: self.quality,
        }
    }
}

/// Execute the thumbnail command.
pub async fn execute(args: ThumbnailArgs, config: &Config) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("Cannot read {:?}", args.input))?;

    let processor = ImageProcessor::new(config);
    let validation = processor.validate(&bytes);
    if !validation.valid {
        anyhow::bail!(
            "{:?} is not a usable image: {}",
            args.input,
            validation.error.unwrap_or_default()
        );
    }

    let thumbnail = processor.thumbnail(bytes, &args.overrides()).await?;
    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&args.output, &thumbnail)
        .await
        .with_context(|| format!("Cannot write {:?}", args.output))?;

    tracing::info!(
        "Thumbnail written to {:?} ({} bytes)",
        args.output,
        thumbnail.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, ImageFormat};

    #[tokio::test]
    async fn test_thumbnail_command_writes_webp() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("fachada.png");
        DynamicImage::new_rgb8(800, 800)
            .save_with_format(&input, ImageFormat::Png)
            .unwrap();
        let output = dir.path().join("cards").join("fachada.webp");

        let args = ThumbnailArgs {
            input,
            output: output.clone(),
            width: Some(200),
            height: None,
            quality: None,
        };
        execute(args, &Config::default()).await.unwrap();

        let decoded = image::open(&output).unwrap();
        assert_eq!(decoded.dimensions(), (200, 300));
    }

    #[tokio::test]
    async fn test_thumbnail_command_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.jpg");
        std::fs::write(&input, b"abcde").unwrap();

        let args = ThumbnailArgs {
            input,
            output: dir.path().join("out.webp"),
            width: None,
            height: None,
            quality: None,
        };
        assert!(execute(args, &Config::default()).await.is_err());
        assert!(!dir.path().join("out.webp").exists());
    }
}
