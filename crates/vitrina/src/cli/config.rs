//! The `vitrina config` command for configuration management.

use clap::{Args, Subcommand};
use std::path::Path;
use vitrina_core::Config;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Print the config file path
    Path,

    /// Write a config file with the defaults
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command.
pub fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    let path = Config::default_path();
    match args.command {
        ConfigCommand::Show => {
            // Strict load here: a broken file should be reported, not masked by defaults
            let config = Config::load()?;
            if !path.exists() {
                eprintln!("# No config file at {}, showing defaults", path.display());
            }
            println!("{}", config.to_toml()?);
        }
        ConfigCommand::Path => println!("{}", path.display()),
        ConfigCommand::Init { force } => {
            write_default_config(&path, force)?;
            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }
    Ok(())
}

/// Write the default configuration to `path`, creating parent directories.
fn write_default_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, Config::default().to_toml()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        write_default_config(&path, false).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.image.max_width, 1920);
        assert_eq!(loaded.thumbnail.width, 400);
    }

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[image]\nquality = 70\n").unwrap();

        assert!(write_default_config(&path, false).is_err());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[image]\nquality = 70\n"
        );

        write_default_config(&path, true).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().image.quality, 85);
    }
}
