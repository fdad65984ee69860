//! The `vitrina process` command: validate, process and publish photos.

mod batch;
mod setup;
pub mod types;

pub use types::OutputFormat;

use clap::Args;
use std::path::PathBuf;
use vitrina_core::{Config, ImageProcessor, LocalStore, ProcessOptions, WatermarkPosition};

use batch::process_batch;
use setup::setup_processor;

/// Arguments for the `process` command.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Image file or directory to process
    #[arg(required = true)]
    pub input: PathBuf,

    /// Storage root for processed photos (overrides storage.root_dir)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Public URL the storage root is served under (overrides storage.public_base_url)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Report file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Skip the watermark stage
    #[arg(long)]
    pub no_watermark: bool,

    /// Watermark logo file
    #[arg(long)]
    pub logo: Option<PathBuf>,

    /// Watermark anchor: northwest, north, ..., southeast (or top-left, bottom-right, ...)
    #[arg(long)]
    pub position: Option<WatermarkPosition>,

    /// Watermark opacity, 0.0-1.0
    #[arg(long)]
    pub opacity: Option<f64>,

    /// Watermark width as a percentage of the photo width
    #[arg(long)]
    pub size_percent: Option<f64>,

    /// Distance from the anchored edges in pixels
    #[arg(long)]
    pub margin: Option<u32>,

    /// Maximum output width
    #[arg(long)]
    pub max_width: Option<u32>,

    /// Maximum output height
    #[arg(long)]
    pub max_height: Option<u32>,

    /// WebP quality 0-100
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: Option<u8>,

    /// Storage key prefix (overrides storage.key_prefix)
    #[arg(long)]
    pub prefix: Option<String>,
}

/// Manual Default impl for constructing ProcessArgs outside of clap.
///
/// Values match the clap defaults above.
impl Default for ProcessArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            out_dir: None,
            base_url: None,
            output: None,
            format: OutputFormat::Json,
            no_watermark: false,
            logo: None,
            position: None,
            opacity: None,
            size_percent: None,
            margin: None,
            max_width: None,
            max_height: None,
            quality: None,
            prefix: None,
        }
    }
}

/// Processing context assembled by setup_processor().
pub(crate) struct ProcessContext {
    pub processor: ImageProcessor,
    pub options: ProcessOptions,
    pub store: LocalStore,
    pub key_prefix: String,
}

/// Execute the process command.
pub async fn execute(args: ProcessArgs, config: Config) -> anyhow::Result<()> {
    let ctx = setup_processor(&args, config)?;

    let files = ctx.processor.discover(&args.input);
    if files.is_empty() {
        tracing::warn!("No supported image files found at {:?}", args.input);
        return Ok(());
    }
    tracing::info!(
        "Found {} image(s) to process, storing under {:?}",
        files.len(),
        ctx.store.root()
    );

    let stats = process_batch(&ctx, &args, files).await?;
    if stats.failed > 0 {
        anyhow::bail!("{} image(s) failed to process", stats.failed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_args_default_format_is_json() {
        let args = ProcessArgs::default();
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn process_args_default_overrides_are_none() {
        let args = ProcessArgs::default();
        assert!(!args.no_watermark);
        assert!(args.output.is_none());
        assert!(args.logo.is_none());
        assert!(args.position.is_none());
        assert!(args.quality.is_none());
        assert!(args.prefix.is_none());
    }
}
