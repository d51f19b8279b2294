#![allow(clippy::must_use_candidate)]

pub mod api;
mod env;
mod loader;
pub mod telemetry;

use serde::Deserialize;

pub use api::*;
pub use env::ExpandError;
pub use telemetry::{LogFormat, TelemetryConfig};

/// Top-level OmniCaption configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Remote caption API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
