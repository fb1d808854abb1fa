//! Configuration management for the fraud scorer

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Environment variable overriding the configuration file location
pub const CONFIG_PATH_ENV: &str = "FRAUD_SCORER_CONFIG";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject on which assessment requests arrive
    pub request_subject: String,
}

/// Classifier artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path to the ONNX classifier
    pub path: String,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_onnx_threads() -> usize {
    1
}

/// Detection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Probability at or above which a transaction is labelled fraudulent
    pub threshold: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

/// Request handling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Maximum requests handled concurrently
    pub workers: usize,
    /// Deadline for a single model call in milliseconds
    pub timeout_ms: u64,
}

impl PipelineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            timeout_ms: 1000,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `FRAUD_SCORER_CONFIG` or the default path
    pub fn load() -> Result<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_path(path)
    }

    /// Load configuration from a specific path.
    ///
    /// `FRAUD_SCORER__SECTION__KEY` environment variables override file values.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix("FRAUD_SCORER").separator("__"))
            .build()
            .with_context(|| format!("Failed to build configuration from {}", path.display()))?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.detection.threshold) {
            anyhow::bail!(
                "detection.threshold must be within [0, 1], got {}",
                self.detection.threshold
            );
        }
        if self.pipeline.workers == 0 {
            anyhow::bail!("pipeline.workers must be at least 1");
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                request_subject: "fraud.assess".to_string(),
            },
            model: ModelConfig {
                path: "models/creditcardfraud.onnx".to_string(),
                onnx_threads: 1,
            },
            detection: DetectionConfig::default(),
            pipeline: PipelineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.nats.url, "nats://localhost:4222");
        assert_eq!(config.nats.request_subject, "fraud.assess");
        assert_eq!(config.detection.threshold, 0.5);
        assert_eq!(config.model.path, "models/creditcardfraud.onnx");
        assert_eq!(config.pipeline.timeout(), Duration::from_millis(1000));
    }

    #[test]
    fn test_load_from_path() {
        let file = write_config(
            r#"
            [nats]
            url = "nats://broker:4222"
            request_subject = "scoring.requests"

            [model]
            path = "/opt/models/fraud.onnx"

            [pipeline]
            workers = 2
            timeout_ms = 250
            "#,
        );

        let config = AppConfig::load_from_path(file.path()).unwrap();

        assert_eq!(config.nats.url, "nats://broker:4222");
        assert_eq!(config.model.path, "/opt/models/fraud.onnx");
        assert_eq!(config.model.onnx_threads, 1);
        assert_eq!(config.pipeline.workers, 2);
        assert_eq!(config.pipeline.timeout_ms, 250);
        assert_eq!(config.detection.threshold, 0.5);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let file = write_config(
            r#"
            [nats]
            url = "nats://localhost:4222"
            request_subject = "fraud.assess"

            [model]
            path = "model.onnx"

            [detection]
            threshold = 1.5
            "#,
        );

        assert!(AppConfig::load_from_path(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(AppConfig::load_from_path("no/such/config.toml").is_err());
    }
}
