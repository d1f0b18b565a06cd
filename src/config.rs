//! Host-level configuration resolved from the environment.

use std::time::Duration;

use crate::error::ConfigError;

/// Read an optional environment variable.
///
/// Missing is `None`; a present but non-UTF-8 value is a configuration error.
fn optional_env(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "value is not valid UTF-8".to_string(),
        }),
    }
}

/// Read and parse an optional environment variable, falling back to `default`.
fn parse_optional_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    Ok(optional_env(key)?
        .map(|s| s.parse())
        .transpose()
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{e}"),
        })?
        .unwrap_or(default))
}

/// Settings for the application host, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Override for the server image reference (`BERTH_IMAGE`).
    pub image_override: Option<String>,
    /// Host address published ports bind to (`BERTH_BIND_HOST`).
    pub bind_host: String,
    /// Timeout for endpoint reachability probes, in seconds
    /// (`BERTH_PROBE_TIMEOUT_SECS`).
    pub probe_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            image_override: None,
            bind_host: "127.0.0.1".to_string(),
            probe_timeout_secs: 2,
        }
    }
}

impl AppConfig {
    /// Resolve the configuration from the process environment.
    pub fn resolve() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            image_override: optional_env("BERTH_IMAGE")?.filter(|s| !s.is_empty()),
            bind_host: optional_env("BERTH_BIND_HOST")?.unwrap_or(defaults.bind_host),
            probe_timeout_secs: parse_optional_env(
                "BERTH_PROBE_TIMEOUT_SECS",
                defaults.probe_timeout_secs,
            )?,
        })
    }

    /// Probe timeout as a [`Duration`].
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}
