//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// autopost: publish HTML documents with embedded metadata as blog posts
#[derive(Parser, Debug)]
#[command(name = "autopost")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (TOML or INI)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload images and create a post from an HTML document
    Publish(PublishArgs),

    /// Configuration management
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// HTML document to publish (use - for stdin)
    pub file: PathBuf,

    /// Target section in the configuration file
    #[arg(short, long, env = "AUTOPOST_TARGET")]
    pub target: String,

    /// Directory relative image paths are resolved against
    #[arg(long, default_value = ".")]
    pub base_dir: PathBuf,

    /// Run the whole transformation without contacting the blog
    #[arg(long)]
    pub dry_run: bool,

    /// Print the assembled draft as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the parsed targets with passwords redacted
    Show,
}
