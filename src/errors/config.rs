// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for configuration loading and validation.

use thiserror::Error;

/// Errors that can occur while loading or validating an [`EngineConfig`](crate::config::EngineConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The YAML document could not be parsed.
    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The TOML document could not be parsed.
    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// The file extension does not map to a known format.
    #[error("Unsupported config format for '{0}': expected .yaml, .yml or .toml")]
    UnsupportedFormat(String),

    /// A value parsed but is outside its accepted range.
    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}
