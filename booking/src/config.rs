//! Configuration management for the booking client.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// REST backend configuration
    pub api: ApiConfig,
    /// Booking session configuration
    pub session: SessionConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// REST backend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint is joined to
    pub base_url: String,
    /// Per-request timeout in seconds
    pub request_timeout: u64,
}

/// Booking session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// File holding the logged-in user
    pub user_cache: PathBuf,
    /// User id sent with anonymous reservations
    pub guest_user_id: i64,
    /// City selected at startup
    pub default_city: String,
    /// Cinema selected at startup
    pub default_cinema: String,
    /// Tax included in every total, in percent
    pub tax_rate_percent: u8,
    /// How long to wait for login or checkout to settle, in seconds
    pub outcome_timeout: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directives (`RUST_LOG` syntax)
    pub filter: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: lookup("BOXOFFICE_API_URL")
                    .unwrap_or_else(|| boxoffice_api::DEFAULT_BASE_URL.to_string()),
                request_timeout: parsed(&lookup, "BOXOFFICE_REQUEST_TIMEOUT_SECS").unwrap_or(10),
            },
            session: SessionConfig {
                user_cache: lookup("BOXOFFICE_USER_CACHE")
                    .map_or_else(|| PathBuf::from(".boxoffice/user.json"), PathBuf::from),
                guest_user_id: parsed(&lookup, "BOXOFFICE_GUEST_USER_ID").unwrap_or(0),
                default_city: lookup("BOXOFFICE_DEFAULT_CITY").unwrap_or_else(|| "quito".to_string()),
                default_cinema: lookup("BOXOFFICE_DEFAULT_CINEMA")
                    .unwrap_or_else(|| "scala".to_string()),
                tax_rate_percent: parsed(&lookup, "BOXOFFICE_TAX_RATE_PERCENT")
                    .filter(|rate: &u8| *rate <= 100)
                    .unwrap_or(crate::pricing::DEFAULT_TAX_RATE_PERCENT),
                outcome_timeout: parsed(&lookup, "BOXOFFICE_OUTCOME_TIMEOUT_SECS").unwrap_or(30),
            },
            logging: LoggingConfig {
                filter: lookup("RUST_LOG")
                    .unwrap_or_else(|| "boxoffice_booking=debug,boxoffice_runtime=info".to_string()),
            },
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ApiConfig {
    /// Per-request timeout
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl SessionConfig {
    /// How long to wait for login or checkout to settle
    #[must_use]
    pub const fn outcome_timeout(&self) -> Duration {
        Duration::from_secs(self.outcome_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.api.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.session.user_cache, PathBuf::from(".boxoffice/user.json"));
        assert_eq!(config.session.guest_user_id, 0);
        assert_eq!(config.session.default_city, "quito");
        assert_eq!(config.session.default_cinema, "scala");
        assert_eq!(config.session.tax_rate_percent, 15);
        assert_eq!(config.session.outcome_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn overrides_and_bad_values() {
        let vars = HashMap::from([
            ("BOXOFFICE_API_URL", "https://cine.example/api"),
            ("BOXOFFICE_DEFAULT_CITY", "guayaquil"),
            ("BOXOFFICE_GUEST_USER_ID", " 42 "),
            ("BOXOFFICE_TAX_RATE_PERCENT", "150"),
            ("BOXOFFICE_REQUEST_TIMEOUT_SECS", "soon"),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(ToString::to_string));

        assert_eq!(config.api.base_url, "https://cine.example/api");
        assert_eq!(config.session.default_city, "guayaquil");
        assert_eq!(config.session.guest_user_id, 42);
        assert_eq!(config.session.tax_rate_percent, 15);
        assert_eq!(config.api.request_timeout, 10);
    }
}
