//! Server configuration from environment variables.

use std::str::FromStr;
use std::time::Duration;

/// Server configuration.
///
/// Env vars:
/// - HOST: bind address (default "0.0.0.0")
/// - PORT: bind port (default 3000)
/// - TICK_MILLIS: wall-clock length of one session tick (default 1000)
/// - SPEECH_RECOGNITION: whether clients can offer spoken answers (default false)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub tick_interval: Duration,
    pub speech_recognition: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            tick_interval: Duration::from_millis(1000),
            speech_recognition: false,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through a custom lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let tick_millis = parse_or(&lookup, "TICK_MILLIS", 1000u64).max(1);

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port),
            tick_interval: Duration::from_millis(tick_millis),
            speech_recognition: parse_or(&lookup, "SPEECH_RECOGNITION", defaults.speech_recognition),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value for {}: {:?}, using default", key, raw);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("TICK_MILLIS", "250"),
            ("SPEECH_RECOGNITION", "true"),
        ]));
        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert!(config.speech_recognition);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup(&[("PORT", "http"), ("TICK_MILLIS", "0")]));
        assert_eq!(config.port, 3000);
        assert_eq!(config.tick_interval, Duration::from_millis(1));
    }
}
