//! Subcommand implementations.

pub mod config;
pub mod process;
pub mod thumbnail;
pub mod validate;
