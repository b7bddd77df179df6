use crate::services::weather::OPEN_METEO_FORECAST_URL;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    /// In-memory store when absent.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub weather_api_url: String,
    pub weather_timeout: Duration,
    /// Report submissions per device per minute.
    pub report_rate_limit: usize,
    pub prune_schedule: String,
    pub session_idle: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_url: None,
            db_max_connections: 10,
            weather_api_url: OPEN_METEO_FORECAST_URL.to_string(),
            weather_timeout: Duration::from_secs(10),
            report_rate_limit: 10,
            prune_schedule: "0 * * * * *".to_string(),
            session_idle: Duration::from_secs(12 * 60 * 60),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; unset or blank values keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| match get("PORT") {
            Some(port) => format!("0.0.0.0:{}", port.trim()),
            None => defaults.bind_addr.clone(),
        });

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL"),
            db_max_connections: parse_or(
                get("DB_MAX_CONNECTIONS"),
                "DB_MAX_CONNECTIONS",
                defaults.db_max_connections,
            )?,
            weather_api_url: get("WEATHER_API_URL").unwrap_or(defaults.weather_api_url),
            weather_timeout: Duration::from_secs(parse_or(
                get("WEATHER_TIMEOUT_SECS"),
                "WEATHER_TIMEOUT_SECS",
                defaults.weather_timeout.as_secs(),
            )?),
            report_rate_limit: parse_or(
                get("REPORT_RATE_LIMIT"),
                "REPORT_RATE_LIMIT",
                defaults.report_rate_limit,
            )?,
            prune_schedule: get("PRUNE_SCHEDULE").unwrap_or(defaults.prune_schedule),
            session_idle: Duration::from_secs(
                parse_or(
                    get("SESSION_IDLE_HOURS"),
                    "SESSION_IDLE_HOURS",
                    defaults.session_idle.as_secs() / 3600,
                )? * 3600,
            ),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert!(config.database_url.is_none());
        assert_eq!(config.weather_api_url, OPEN_METEO_FORECAST_URL);
        assert_eq!(config.report_rate_limit, 10);
        assert_eq!(config.session_idle, Duration::from_secs(12 * 3600));
    }

    #[test]
    fn test_port_fallback_and_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/charcos"),
            ("REPORT_RATE_LIMIT", " 3 "),
            ("SESSION_IDLE_HOURS", "1"),
            ("WEATHER_TIMEOUT_SECS", ""),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/charcos"));
        assert_eq!(config.report_rate_limit, 3);
        assert_eq!(config.session_idle, Duration::from_secs(3600));
        assert_eq!(config.weather_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let err = Config::from_lookup(lookup(&[("REPORT_RATE_LIMIT", "lots")])).unwrap_err();
        assert!(err.to_string().contains("REPORT_RATE_LIMIT"));
    }
}
