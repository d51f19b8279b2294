use serde::Deserialize;
use url::Url;

/// Base URL used when neither the environment nor a config file provides one
pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";

/// Environment variable that overrides the configured base URL
pub const API_URL_ENV: &str = "OMNICAPTION_API_URL";

/// Remote caption API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Service root; request paths such as `/api/generate` are appended to it
    #[serde(default = "default_base_url")]
    pub base_url: Url,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl ApiConfig {
    /// Build a configuration pointing at the given URL
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed or is not http(s)
    pub fn with_base_url(base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("invalid base URL `{base_url}`: {e}"))?;
        let config = Self { base_url };
        config.validate()?;
        Ok(config)
    }

    /// Resolve the base URL from `OMNICAPTION_API_URL`, falling back to the local default
    ///
    /// # Errors
    ///
    /// Returns an error if the environment value is not a valid http(s) URL
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();
        config.apply_env_override()?;
        Ok(config)
    }

    /// Replace the base URL with `OMNICAPTION_API_URL` when it is set and non-empty
    ///
    /// # Errors
    ///
    /// Returns an error if the environment value is not a valid http(s) URL
    pub fn apply_env_override(&mut self) -> anyhow::Result<()> {
        let Ok(value) = std::env::var(API_URL_ENV) else {
            return Ok(());
        };

        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }

        *self = Self::with_base_url(value)
            .map_err(|e| anyhow::anyhow!("{API_URL_ENV} is not usable: {e}"))?;

        Ok(())
    }

    /// Ensure the base URL can carry HTTP requests
    ///
    /// # Errors
    ///
    /// Returns an error if the scheme is not `http` or `https` or the URL has no host
    pub fn validate(&self) -> anyhow::Result<()> {
        if !matches!(self.base_url.scheme(), "http" | "https") {
            anyhow::bail!(
                "base URL must use http or https, got `{}`",
                self.base_url.scheme()
            );
        }

        if self.base_url.host_str().is_none() {
            anyhow::bail!("base URL `{}` has no host", self.base_url);
        }

        Ok(())
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_service() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url.as_str(), "http://localhost:8001/");
    }

    #[test]
    fn env_override_wins_over_default() {
        temp_env::with_var(API_URL_ENV, Some("https://captions.example.com"), || {
            let config = ApiConfig::from_env().unwrap();
            assert_eq!(config.base_url.as_str(), "https://captions.example.com/");
        });
    }

    #[test]
    fn unset_env_falls_back_to_default() {
        temp_env::with_var_unset(API_URL_ENV, || {
            let config = ApiConfig::from_env().unwrap();
            assert_eq!(config.base_url.as_str(), "http://localhost:8001/");
        });
    }

    #[test]
    fn blank_env_is_ignored() {
        temp_env::with_var(API_URL_ENV, Some("   "), || {
            let config = ApiConfig::from_env().unwrap();
            assert_eq!(config.base_url.as_str(), "http://localhost:8001/");
        });
    }

    #[test]
    fn invalid_env_value_is_an_error() {
        temp_env::with_var(API_URL_ENV, Some("not a url"), || {
            let err = ApiConfig::from_env().unwrap_err();
            assert!(err.to_string().contains(API_URL_ENV));
        });
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let err = ApiConfig::with_base_url("ftp://files.example.com").unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }
}
