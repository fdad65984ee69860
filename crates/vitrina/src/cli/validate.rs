//! The `vitrina validate` command: header checks without processing.

use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use vitrina_core::{Config, ImageProcessor, ValidationResult};

/// Arguments for the `validate` command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Files to check
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// One output line.
#[derive(Debug, Serialize)]
struct FileValidation<'a> {
    file: &'a Path,
    #[serde(flatten)]
    result: ValidationResult,
}

/// Print one JSON line per file; fail if any file is invalid.
pub fn execute(args: ValidateArgs, config: &Config) -> anyhow::Result<()> {
    let processor = ImageProcessor::new(config);
    let mut invalid = 0usize;

    for file in &args.files {
        let result = check_file(&processor, file);
        if !result.valid {
            invalid += 1;
        }
        println!(
            "{}",
            serde_json::to_string(&FileValidation { file, result })?
        );
    }

    if invalid > 0 {
        anyhow::bail!("{} of {} file(s) failed validation", invalid, args.files.len());
    }
    Ok(())
}

fn check_file(processor: &ImageProcessor, path: &Path) -> ValidationResult {
    match std::fs::read(path) {
        Ok(bytes) => processor.validate(&bytes),
        Err(e) => ValidationResult::invalid(format!("Cannot read file: {e}")),
    }
}
