use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

pub const ADDR_VAR: &str = "STOREFRONT_ADDR";
pub const LOG_FORMAT_VAR: &str = "STOREFRONT_LOG_FORMAT";
const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidAddr { var: &'static str, value: String },
    #[error("{var} must be `compact` or `json`, got {value}")]
    InvalidLogFormat { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

/// Process configuration, read from the environment (and `.env` if present).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub addr: SocketAddr,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from any variable source; unset variables take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr_value = lookup(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidAddr {
                var: ADDR_VAR,
                value: addr_value.clone(),
            })?;

        let log_format = match lookup(LOG_FORMAT_VAR) {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidLogFormat {
                var: LOG_FORMAT_VAR,
                value: value.clone(),
            })?,
            None => LogFormat::default(),
        };

        Ok(Self { addr, log_format })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.log_format, LogFormat::Compact);
    }

    #[rstest]
    #[case("json", LogFormat::Json)]
    #[case("JSON", LogFormat::Json)]
    #[case(" compact ", LogFormat::Compact)]
    fn log_format_is_parsed(#[case] raw: &str, #[case] expected: LogFormat) {
        let config = Config::from_lookup(lookup(&[(LOG_FORMAT_VAR, raw)])).unwrap();
        assert_eq!(config.log_format, expected);
    }

    #[test]
    fn bad_values_are_reported_with_their_variable() {
        assert_eq!(
            Config::from_lookup(lookup(&[(ADDR_VAR, "localhost")])),
            Err(ConfigError::InvalidAddr {
                var: ADDR_VAR,
                value: "localhost".into(),
            })
        );
        assert!(matches!(
            Config::from_lookup(lookup(&[(LOG_FORMAT_VAR, "pretty")])),
            Err(ConfigError::InvalidLogFormat { .. })
        ));
    }
}
