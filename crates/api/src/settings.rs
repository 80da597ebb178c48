//! Server Configuration
//!
//! Settings are layered: built-in defaults, then an optional config file,
//! then `PLANT__`-prefixed environment variables
//! (`PLANT__SERVER__PORT=8080`, `PLANT__MODEL__PATH=/models/plant.onnx`).

use ::config::{Config, Environment, File};
use serde::Deserialize;

use crate::rate_limit::RateLimitConfig;

/// Config file looked up when no path is given; any supported extension works
pub const DEFAULT_CONFIG_FILE: &str = "plant-health";

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "PLANT_CONFIG";

/// Complete server settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    /// Per-peer rate limit, disabled when absent
    pub rate_limit: Option<RateLimitConfig>,
}

/// Listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5050,
        }
    }
}

impl ServerConfig {
    /// Address to bind, e.g. `0.0.0.0:5050`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Classifier artifact settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the ONNX classifier
    pub path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "plant_model.onnx".to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Max level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Prometheus exporter settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Serve `/metrics`
    pub enabled: bool,
}

impl Settings {
    /// Load settings from `path`, `$PLANT_CONFIG`, or the default file name.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let path = path
            .map(str::to_string)
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let settings = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix("PLANT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::config::FileFormat;

    fn from_toml(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.bind_addr(), "0.0.0.0:5050");
        assert_eq!(settings.model.path, "plant_model.onnx");
        assert_eq!(settings.logging.level, "info");
        assert!(!settings.metrics.enabled);
        assert!(settings.rate_limit.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = from_toml(
            r#"
            [server]
            port = 8080

            [model]
            path = "/models/plant.onnx"
            "#,
        );

        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.model.path, "/models/plant.onnx");
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_rate_limit_section() {
        let settings = from_toml(
            r#"
            [rate_limit]
            per_second = 1
            burst_size = 20
            "#,
        );

        let limit = settings.rate_limit.unwrap();
        assert_eq!(limit.per_second, 1);
        assert_eq!(limit.burst_size, 20);
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let settings = Settings::load(Some("/nonexistent/plant-health-test.toml")).unwrap();
        assert_eq!(settings.server.port, 5050);
    }
}
