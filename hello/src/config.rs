//! Typed configuration loaded from environment variables.
//!
//! Values may also come from a `.env` file; call [`load_dotenv`] before
//! [`Config::from_env`].

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_HOST: &str = "HELLO_HOST";
pub const ENV_PORT: &str = "HELLO_PORT";
pub const ENV_NAME: &str = "HELLO_NAME";
pub const ENV_TESTING: &str = "HELLO_TESTING";
pub const ENV_LOG_JSON: &str = "HELLO_LOG_JSON";
pub const ENV_REQUEST_TIMEOUT: &str = "HELLO_REQUEST_TIMEOUT";
pub const ENV_MAX_BODY_BYTES: &str = "HELLO_MAX_BODY_BYTES";

/// Load environment variables from a `.env` file if it exists.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Get an environment variable, falling back to `default` when unset.
pub fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get and parse an environment variable, falling back to `default` when
/// unset. A value that is set but does not parse is an error.
pub fn get_env_parsed_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

/// Get an on/off environment variable, falling back to `default` when unset.
///
/// Accepts `true`/`false`, `1`/`0`, `yes`/`no` and `on`/`off`, ignoring case.
pub fn get_env_flag_or(key: &str, default: bool) -> Result<bool, ConfigError> {
    let Ok(value) = env::var(key) else {
        return Ok(default);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            value,
        }),
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Who the home route greets.
    pub name: String,
    /// Start in testing mode: handler panics propagate instead of becoming 500s.
    pub testing: bool,
    pub log_json: bool,
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            name: "World".to_string(),
            testing: false,
            log_json: false,
            request_timeout: Duration::from_secs(30),
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl Config {
    /// Reads every `HELLO_*` variable, using defaults for unset ones.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            host: get_env_or(ENV_HOST, &defaults.host),
            port: get_env_parsed_or(ENV_PORT, defaults.port)?,
            name: get_env_or(ENV_NAME, &defaults.name),
            testing: get_env_flag_or(ENV_TESTING, defaults.testing)?,
            log_json: get_env_flag_or(ENV_LOG_JSON, defaults.log_json)?,
            request_timeout: Duration::from_secs(get_env_parsed_or(
                ENV_REQUEST_TIMEOUT,
                defaults.request_timeout.as_secs(),
            )?),
            max_body_bytes: get_env_parsed_or(ENV_MAX_BODY_BYTES, defaults.max_body_bytes)?,
        })
    }

    /// The `host:port` string to bind.
    pub fn addr(&self) -> String {
        match self.host.parse::<std::net::IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, self.port).to_string(),
            Err(_) => format!("{}:{}", self.host, self.port),
        }
    }
}

/// Configuration loading errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Environment variable value is invalid.
    Invalid { key: String, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid { key, value } => write!(
                f,
                "Invalid value '{}' for environment variable '{}'",
                value, key
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
