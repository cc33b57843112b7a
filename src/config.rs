//! Tool configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via TELINK_CONFIG or --config)
//! 3. Environment variables

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use telink_codec::{Decoder, Encoder, Endianness, DEFAULT_MAX_DEPTH};

/// Tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Codec configuration.
    pub codec: CodecConfig,
    /// Frame configuration.
    pub frame: FrameConfig,
}

impl Config {
    /// Loads configuration from `path` if given, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides looked up through `var`.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        self.codec.apply_overrides(&var);
        self.frame.apply_overrides(&var);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.codec.validate()
    }
}

/// Codec configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Byte order for values whose format does not fix one (addresses).
    pub endianness: Endianness,
    /// Recursion ceiling for nested values.
    pub max_depth: usize,
    /// Fail instead of dropping non-ASCII characters from fixed-length strings.
    pub strict_ascii: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            endianness: Endianness::Little,
            max_depth: DEFAULT_MAX_DEPTH,
            strict_ascii: false,
        }
    }
}

impl CodecConfig {
    fn apply_overrides(&mut self, var: &impl Fn(&str) -> Option<String>) {
        if let Some(value) = var("TELINK_ENDIANNESS") {
            if let Ok(parsed) = value.parse() {
                self.endianness = parsed;
            }
        }

        if let Some(value) = var("TELINK_MAX_DEPTH") {
            if let Ok(depth) = value.parse() {
                self.max_depth = depth;
            }
        }

        if let Some(value) = var("TELINK_STRICT_ASCII") {
            if let Ok(strict) = value.parse() {
                self.strict_ascii = strict;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ValidationError(
                "codec.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds a decoder with these settings.
    pub fn decoder(&self, endianness: Endianness) -> Decoder {
        Decoder::new(endianness).with_max_depth(self.max_depth)
    }

    /// Builds an encoder with these settings.
    pub fn encoder(&self, endianness: Endianness) -> Encoder {
        Encoder::new(endianness)
            .with_max_depth(self.max_depth)
            .with_strict_ascii(self.strict_ascii)
    }
}

/// Frame configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Reject frames whose length field disagrees with the payload.
    pub strict_length: bool,
}

impl FrameConfig {
    fn apply_overrides(&mut self, var: &impl Fn(&str) -> Option<String>) {
        if let Some(value) = var("TELINK_STRICT_LENGTH") {
            if let Ok(strict) = value.parse() {
                self.strict_length = strict;
            }
        }
    }
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    IoError(PathBuf, std::io::Error),
    ParseError(PathBuf, String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => {
                write!(f, "failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::ValidationError(msg) => {
                write!(f, "configuration validation failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
