//! Runtime configuration

use std::env;
use std::time::Duration;
use tracing::warn;

use crate::board::Side;

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the move-proposal service
    pub service_url: String,
    pub request_timeout: Duration,
    /// The side the local player controls; the service plays the other one
    pub human_side: Side,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            human_side: Side::White,
        }
    }
}

impl Config {
    /// Reads `CHESS_SERVICE_URL`, `CHESS_SERVICE_TIMEOUT_SECS` and `CHESS_HUMAN_SIDE`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("CHESS_SERVICE_URL").filter(|u| !u.trim().is_empty()) {
            config.service_url = url.trim().to_string();
        }

        if let Some(secs) = lookup("CHESS_SERVICE_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => warn!(value = %secs, "ignoring invalid CHESS_SERVICE_TIMEOUT_SECS"),
            }
        }

        if let Some(side) = lookup("CHESS_HUMAN_SIDE") {
            match side.parse::<Side>() {
                Ok(side) => config.human_side = side,
                Err(e) => warn!("ignoring CHESS_HUMAN_SIDE: {}", e),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, Config::default());
        assert_eq!(config.service_url, "http://127.0.0.1:5000");
        assert_eq!(config.human_side, Side::White);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("CHESS_SERVICE_URL", "http://engine:8080"),
            ("CHESS_SERVICE_TIMEOUT_SECS", "5"),
            ("CHESS_HUMAN_SIDE", "black"),
        ]);
        assert_eq!(config.service_url, "http://engine:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.human_side, Side::Black);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("CHESS_SERVICE_TIMEOUT_SECS", "soon"),
            ("CHESS_HUMAN_SIDE", "purple"),
        ]);
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.human_side, Side::White);
    }
}
