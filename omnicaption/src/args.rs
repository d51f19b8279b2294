use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use omnicaption_client::Tone;

/// OmniCaption caption generator
#[derive(Debug, Parser)]
#[command(
    name = "omnicaption",
    version,
    about = "Generate Twitter, LinkedIn, Instagram, and YouTube captions from a topic or image"
)]
pub struct Args {
    /// Path to configuration file (defaults to `omnicaption.toml` when present)
    #[arg(short, long, env = "OMNICAPTION_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Override the caption service base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Log filter directive, e.g. `debug` or `omnicaption_client=trace`
    #[arg(long, env = "OMNICAPTION_LOG", global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate captions for a topic and/or an image
    Generate(GenerateArgs),
    /// Check that the caption service is reachable
    Health,
    /// List the accepted tones
    Tones,
}

#[derive(Debug, clap::Args)]
pub struct GenerateArgs {
    /// Topic or content idea
    pub topic: Option<String>,

    /// Tone of the captions
    #[arg(short, long, default_value_t = Tone::Professional, value_parser = parse_tone)]
    pub tone: Tone,

    /// Image file to caption
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One card per platform
    Text,
    /// The raw captions object
    Json,
}

fn parse_tone(label: &str) -> Result<Tone, String> {
    Tone::parse(label).map_err(|e| e.to_string())
}
