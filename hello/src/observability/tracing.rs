use std::error::Error;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::Config;

/// Configuration for the tracing subscriber.
///
/// `RUST_LOG`, when set, takes precedence over [`level`](Self::level).
///
/// ```no_run
/// use hello::observability::TracingConfig;
///
/// TracingConfig::new().json().try_init().expect("subscriber already set");
/// ```
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub json: bool,
    pub level: Level,
    pub with_target: bool,
    pub with_file: bool,
    pub with_line_number: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            json: false,
            level: Level::INFO,
            with_target: true,
            with_file: false,
            with_line_number: false,
        }
    }
}

impl TracingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the logging setup from application configuration.
    pub fn from_config(config: &Config) -> Self {
        let tracing = Self::new();
        if config.log_json { tracing.json() } else { tracing }
    }

    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    pub fn with_file(mut self, enabled: bool) -> Self {
        self.with_file = enabled;
        self
    }

    pub fn with_line_number(mut self, enabled: bool) -> Self {
        self.with_line_number = enabled;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.to_string()))
    }

    /// Installs the global subscriber. Fails if one is already installed.
    pub fn try_init(self) -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
        let builder = fmt()
            .with_env_filter(self.filter())
            .with_target(self.with_target)
            .with_file(self.with_file)
            .with_line_number(self.with_line_number);

        if self.json {
            builder.json().try_init()
        } else {
            builder.try_init()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TracingConfig::default();
        assert!(!config.json);
        assert_eq!(config.level, Level::INFO);
        assert!(config.with_target);
        assert!(!config.with_file);
        assert!(!config.with_line_number);
    }

    #[test]
    fn test_builder_chain() {
        let config = TracingConfig::new()
            .json()
            .level(Level::DEBUG)
            .with_target(false)
            .with_file(true)
            .with_line_number(true);

        assert!(config.json);
        assert_eq!(config.level, Level::DEBUG);
        assert!(!config.with_target);
        assert!(config.with_file && config.with_line_number);
    }

    #[test]
    fn test_from_config_follows_log_json() {
        let config = Config {
            log_json: true,
            ..Config::default()
        };
        assert!(TracingConfig::from_config(&config).json);
        assert!(!TracingConfig::from_config(&Config::default()).json);
    }
}
