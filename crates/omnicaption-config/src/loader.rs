use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded = crate::env::expand_env(raw)
            .map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded)
            .map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Resolve the effective configuration
    ///
    /// Starts from the file at `path` when one is given and exists, otherwise
    /// from defaults, then applies the `OMNICAPTION_API_URL` override. A path
    /// that was given explicitly but does not exist is only skipped when
    /// `required` is false.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is invalid, a required file is missing,
    /// or the environment override is not a valid URL
    pub fn resolve(path: Option<&Path>, required: bool) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => Self::load(path)?,
            Some(path) if required => {
                anyhow::bail!("config file {} does not exist", path.display());
            }
            _ => Self::default(),
        };

        config.api.apply_env_override()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is unusable or the log filter is empty
    pub fn validate(&self) -> anyhow::Result<()> {
        self.api.validate()?;

        if self.telemetry.log_filter.trim().is_empty() {
            anyhow::bail!("telemetry.log_filter must not be empty");
        }

        Ok(())
    }
}
