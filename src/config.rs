//! Server configuration from the environment.
//!
//! HOST (default 0.0.0.0), PORT (default 8080), POLL_INTERVAL_MS (default 250)
//! and POLL_ATTEMPTS (default 20) for the round-await endpoint.

use std::time::Duration;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Delay between reads when waiting for a round to appear.
    pub poll_interval: Duration,
    /// Reads before giving up on a round.
    pub poll_attempts: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            poll_interval: Duration::from_millis(250),
            poll_attempts: 20,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparsable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            poll_interval: lookup("POLL_INTERVAL_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            poll_attempts: lookup("POLL_ATTEMPTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.poll_attempts),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}
