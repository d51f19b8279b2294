#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod render;

use std::path::Path;

use args::{Args, Command, GenerateArgs, OutputFormat};
use clap::Parser;
use omnicaption_client::{CaptionClient, CaptionSession, ImageUpload};
use omnicaption_config::{API_URL_ENV, ApiConfig, Config};

/// Config file picked up from the working directory when `--config` is not given
const DEFAULT_CONFIG_PATH: &str = "omnicaption.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // An explicit config path must exist; the default one is optional
    let config_path = args.config.as_deref().unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    let mut config = Config::resolve(Some(config_path), args.config.is_some())?;

    if let Some(api_url) = &args.api_url {
        config.api = ApiConfig::with_base_url(api_url)?;
    }

    omnicaption_telemetry::init(&config.telemetry, args.log_filter.as_deref())?;

    // First event after the subscriber is installed
    tracing::debug!(
        config_file = %config_path.display(),
        config_file_found = config_path.exists(),
        env_override = std::env::var_os(API_URL_ENV).is_some(),
        flag_override = args.api_url.is_some(),
        base_url = %config.api.base_url,
        "configuration resolved"
    );

    let client = CaptionClient::from_config(&config.api);

    match args.command {
        Command::Generate(generate_args) => generate(&client, generate_args).await,
        Command::Health => health(&client).await,
        Command::Tones => {
            println!("{}", render::tones());
            Ok(())
        }
    }
}

/// Fill a session from the command line and submit it once
async fn generate(client: &CaptionClient, args: GenerateArgs) -> anyhow::Result<()> {
    let mut session = CaptionSession::new();
    session.set_tone(args.tone);

    if let Some(topic) = args.topic {
        session.set_topic(topic);
    }

    if let Some(path) = &args.image {
        session.select_image(ImageUpload::from_path(path).await?);
    }

    let results = session.submit(client).await?;

    let output = match args.format {
        OutputFormat::Text => render::cards(results),
        OutputFormat::Json => serde_json::to_string_pretty(results)?,
    };

    println!("{output}");

    Ok(())
}

async fn health(client: &CaptionClient) -> anyhow::Result<()> {
    let status = client.health().await?;

    println!("{}", render::health(&status));

    if !status.is_ok() {
        anyhow::bail!("caption service at {} is not healthy", client.base_url());
    }

    Ok(())
}
