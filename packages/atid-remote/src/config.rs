//! Remote client configuration.

use std::time::Duration;

use atid_core::config::{keys, Settings};
use atid_core::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "http://simbad.u-strasbg.fr/simbad/sim-script";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 20;

/// Remote catalog configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Script service URL
    pub endpoint: String,
    /// Upper bound on one round trip
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

impl RemoteConfig {
    /// Reads `Remote/SIMBAD/*`, keeping defaults for missing keys.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(endpoint) = settings.get(keys::REMOTE_ENDPOINT) {
            config.endpoint = endpoint.trim().to_string();
        }
        if let Some(seconds) = settings.get_parsed::<f64>(keys::REMOTE_TIMEOUT_SECONDS)? {
            if !seconds.is_finite() || seconds <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: keys::REMOTE_TIMEOUT_SECONDS.to_string(),
                    value: seconds.to_string(),
                });
            }
            config.timeout = Duration::from_secs_f64(seconds);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RemoteConfig::from_settings(&Settings::new()).unwrap();
        assert_eq!(config, RemoteConfig::default());
        assert_eq!(config.timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::new()
            .with("Remote/SIMBAD/Endpoint", "http://127.0.0.1:8080/sim-script")
            .with("Remote/SIMBAD/TimeoutSeconds", "2.5");
        let config = RemoteConfig::from_settings(&settings).unwrap();
        assert_eq!(config.endpoint, "http://127.0.0.1:8080/sim-script");
        assert_eq!(config.timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_rejects_non_positive_timeout() {
        let settings = Settings::new().with("Remote/SIMBAD/TimeoutSeconds", "0");
        assert!(RemoteConfig::from_settings(&settings).is_err());
        let settings = Settings::new().with("Remote/SIMBAD/TimeoutSeconds", "soon");
        assert!(RemoteConfig::from_settings(&settings).is_err());
    }
}
