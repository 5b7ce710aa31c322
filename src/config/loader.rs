// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_BACKPRESSURE_CHUNK_SIZE, DEFAULT_BATCH_SIZE, DEFAULT_CHUNK_DELAY_MS,
    DEFAULT_FIBONACCI_N, DEFAULT_LOG_LEVEL, DEFAULT_SIMULATED_LATENCY_MS, MAX_FIBONACCI_N,
    MIN_FIBONACCI_N,
};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for the processing engine.
///
/// Every section is optional and falls back to the built-in defaults in
/// [`crate::config::consts`], so an empty file is a valid configuration.
///
/// # Example
/// ```yaml
/// processing:
///   simulated_latency_ms: 25
///   default_batch_size: 5
///   text_case: upper
/// offload:
///   fibonacci_n: 30
/// pipeline:
///   backpressure_chunk_size: 100
///   chunk_delay_ms: 10
/// logging:
///   level: debug
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub processing: ProcessingSettings,
    #[serde(default)]
    pub offload: OffloadSettings,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Settings for the iterative and batch processors.
///
/// # Fields
/// * `simulated_latency_ms` - Latency awaited per item on the non-offloaded path
/// * `default_batch_size` - Chunk size used by `process_batch_default`
/// * `text_case` - Case applied to textual payloads by the default item processor
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProcessingSettings {
    pub simulated_latency_ms: u64,
    pub default_batch_size: usize,
    pub text_case: TextCase,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            simulated_latency_ms: DEFAULT_SIMULATED_LATENCY_MS,
            default_batch_size: DEFAULT_BATCH_SIZE,
            text_case: TextCase::default(),
        }
    }
}

impl ProcessingSettings {
    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

/// Case conversion applied to textual items.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextCase {
    #[default]
    Upper,
    Lower,
    Proper,
    Title,
}

/// Settings for the worker offload executor.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct OffloadSettings {
    /// Input to the recursive Fibonacci stand-in for CPU work
    pub fibonacci_n: u32,
}

impl Default for OffloadSettings {
    fn default() -> Self {
        Self {
            fibonacci_n: DEFAULT_FIBONACCI_N,
        }
    }
}

impl OffloadSettings {
    /// Clamp a requested Fibonacci input to the supported bounds.
    ///
    /// # Example
    /// ```
    /// use the_conveyor::config::OffloadSettings;
    ///
    /// let settings = OffloadSettings { fibonacci_n: 90 };
    /// assert_eq!(settings.clamped_fibonacci_n(), 40);
    /// ```
    pub fn clamped_fibonacci_n(&self) -> u32 {
        self.fibonacci_n.clamp(MIN_FIBONACCI_N, MAX_FIBONACCI_N)
    }
}

/// Settings for the stream pipeline demonstrations.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineSettings {
    pub backpressure_chunk_size: usize,
    pub chunk_delay_ms: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            backpressure_chunk_size: DEFAULT_BACKPRESSURE_CHUNK_SIZE,
            chunk_delay_ms: DEFAULT_CHUNK_DELAY_MS,
        }
    }
}

impl PipelineSettings {
    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }
}

/// Logging settings. `RUST_LOG` takes precedence over `level` when set.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Load a config from a YAML (`.yaml`/`.yml`) or TOML (`.toml`) file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
        Some("toml") => Ok(toml::from_str(&content)?),
        _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Load and validate a config file.
///
/// Sizes of zero are rejected; the Fibonacci input is clamped rather than rejected.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let cfg = load_config(path)?;
    validate_config(cfg)
}

/// Validate an already-parsed config, returning it with out-of-range values clamped.
pub fn validate_config(mut cfg: EngineConfig) -> Result<EngineConfig, ConfigError> {
    if cfg.processing.default_batch_size == 0 {
        return Err(ConfigError::Invalid {
            field: "processing.default_batch_size",
            reason: "must be at least 1".to_string(),
        });
    }

    if cfg.pipeline.backpressure_chunk_size == 0 {
        return Err(ConfigError::Invalid {
            field: "pipeline.backpressure_chunk_size",
            reason: "must be at least 1".to_string(),
        });
    }

    let clamped = cfg.offload.clamped_fibonacci_n();
    if clamped != cfg.offload.fibonacci_n {
        tracing::warn!(
            requested = cfg.offload.fibonacci_n,
            clamped,
            "offload.fibonacci_n out of bounds, clamping"
        );
        cfg.offload.fibonacci_n = clamped;
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let cfg: EngineConfig = serde_yaml::from_str("{}").unwrap();

        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.processing.default_batch_size, 5);
        assert_eq!(cfg.processing.text_case, TextCase::Upper);
        assert_eq!(cfg.offload.fibonacci_n, 30);
        assert_eq!(cfg.processing.simulated_latency(), Duration::from_millis(25));
        assert_eq!(cfg.pipeline.backpressure_chunk_size, 100);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_partial_override() {
        let yaml = r#"
processing:
  default_batch_size: 3
  text_case: title
pipeline:
  chunk_delay_ms: 1
"#;
        let cfg: EngineConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(cfg.processing.default_batch_size, 3);
        assert_eq!(cfg.processing.text_case, TextCase::Title);
        // untouched fields keep their defaults
        assert_eq!(cfg.processing.simulated_latency_ms, DEFAULT_SIMULATED_LATENCY_MS);
        assert_eq!(cfg.pipeline.chunk_delay(), Duration::from_millis(1));
        assert_eq!(cfg.pipeline.backpressure_chunk_size, 100);
    }

    #[test]
    fn test_load_yaml_file() {
        let file = write_temp(
            ".yaml",
            "offload:\n  fibonacci_n: 20\nlogging:\n  level: debug\n",
        );

        let cfg = load_and_validate_config(file.path()).unwrap();
        assert_eq!(cfg.offload.fibonacci_n, 20);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn test_load_toml_file() {
        let file = write_temp(
            ".toml",
            "[processing]\nsimulated_latency_ms = 7\n\n[pipeline]\nbackpressure_chunk_size = 10\n",
        );

        let cfg = load_and_validate_config(file.path()).unwrap();
        assert_eq!(cfg.processing.simulated_latency(), Duration::from_millis(7));
        assert_eq!(cfg.pipeline.backpressure_chunk_size, 10);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp(".ini", "level=info");

        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_config("/definitely/not/here.yaml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let file = write_temp(".yaml", "processing:\n  default_batch_size: 0\n");

        let error = load_and_validate_config(file.path()).unwrap_err();
        assert!(error.to_string().contains("processing.default_batch_size"));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let cfg = EngineConfig {
            pipeline: PipelineSettings {
                backpressure_chunk_size: 0,
                chunk_delay_ms: 0,
            },
            ..Default::default()
        };

        assert!(validate_config(cfg).is_err());
    }

    #[test]
    fn test_fibonacci_n_clamped() {
        let cfg = EngineConfig {
            offload: OffloadSettings { fibonacci_n: 0 },
            ..Default::default()
        };
        assert_eq!(validate_config(cfg).unwrap().offload.fibonacci_n, 1);

        let cfg = EngineConfig {
            offload: OffloadSettings { fibonacci_n: 1_000 },
            ..Default::default()
        };
        assert_eq!(validate_config(cfg).unwrap().offload.fibonacci_n, 40);
    }

    #[test]
    fn test_malformed_yaml() {
        let file = write_temp(".yaml", "processing: [not, a, map]\n");

        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }
}
