//! Processor setup: CLI overrides on top of the loaded config.

use vitrina_core::{
    Config, ImageConfigOverrides, ImageProcessor, LocalStore, ProcessOptions, WatermarkOverrides,
};

use super::{ProcessArgs, ProcessContext};

/// Validate input and assemble everything needed for processing.
pub fn setup_processor(args: &ProcessArgs, mut config: Config) -> anyhow::Result<ProcessContext> {
    if !args.input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            args.input
        );
    }

    // Storage settings are process-wide, so they go into the config itself
    if let Some(out_dir) = &args.out_dir {
        config.storage.root_dir = out_dir.clone();
    }
    if let Some(base_url) = &args.base_url {
        config.storage.public_base_url = base_url.clone();
    }
    if let Some(prefix) = &args.prefix {
        config.storage.key_prefix = prefix.clone();
    }

    let options = process_options(args, &config);
    if options.add_watermark {
        let effective = config.watermark.with_overrides(&options.watermark);
        effective.validate()?;
        if !effective.resolved_logo_path().exists() {
            tracing::warn!(
                "Watermark logo {:?} not found, photos will be published without it",
                effective.resolved_logo_path()
            );
        }
    }
    config.image.with_overrides(&options.image).validate()?;

    Ok(ProcessContext {
        processor: ImageProcessor::new(&config),
        options,
        store: LocalStore::from_config(&config.storage),
        key_prefix: config.storage.key_prefix.clone(),
    })
}

/// Per-call pipeline options from the CLI flags.
fn process_options(args: &ProcessArgs, config: &Config) -> ProcessOptions {
    ProcessOptions {
        add_watermark: config.processing.watermark_by_default && !args.no_watermark,
        image: ImageConfigOverrides {
            max_width: args.max_width,
            max_height: args.max_height,
            quality: args.quality,
            auto_orient: None,
        },
        watermark: WatermarkOverrides {
            logo_path: args.logo.clone(),
            size_percent: args.size_percent,
            opacity: args.opacity,
            position: args.position,
            margin: args.margin,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use vitrina_core::WatermarkPosition;

    fn args_for(input: PathBuf) -> ProcessArgs {
        ProcessArgs {
            input,
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_input_is_error() {
        let args = args_for(PathBuf::from("/no/such/listing"));
        assert!(setup_processor(&args, Config::default()).is_err());
    }

    #[test]
    fn test_flags_become_overrides() {
        let args = ProcessArgs {
            position: Some(WatermarkPosition::North),
            margin: Some(5),
            quality: Some(60),
            ..Default::default()
        };
        let options = process_options(&args, &Config::default());
        assert!(options.add_watermark);
        assert_eq!(options.watermark.position, Some(WatermarkPosition::North));
        assert_eq!(options.watermark.margin, Some(5));
        assert_eq!(options.image.quality, Some(60));
        assert_eq!(options.image.max_width, None);
    }

    #[test]
    fn test_watermark_off_by_flag_or_config() {
        let args = ProcessArgs {
            no_watermark: true,
            ..Default::default()
        };
        assert!(!process_options(&args, &Config::default()).add_watermark);

        let mut config = Config::default();
        config.processing.watermark_by_default = false;
        assert!(!process_options(&ProcessArgs::default(), &config).add_watermark);
    }

    #[test]
    fn test_invalid_override_fails_setup() {
        let dir = tempfile::tempdir().unwrap();
        let args = ProcessArgs {
            opacity: Some(1.5),
            ..args_for(dir.path().to_path_buf())
        };
        assert!(setup_processor(&args, Config::default()).is_err());
    }

    #[test]
    fn test_storage_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let args = ProcessArgs {
            out_dir: Some(dir.path().join("media")),
            prefix: Some("obra-nueva".to_string()),
            ..args_for(dir.path().to_path_buf())
        };
        let ctx = setup_processor(&args, Config::default()).unwrap();
        assert_eq!(ctx.store.root(), dir.path().join("media"));
        assert_eq!(ctx.key_prefix, "obra-nueva");
    }
}
