//! Compile configuration
//!
//! Loadable from a TOML file:
//!
//! ```toml
//! suffix_len = 8
//! unknown_attributes = "drop"
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::sanitize::DEFAULT_SUFFIX_LEN;

/// Shortest accepted hash suffix
pub const MIN_SUFFIX_LEN: usize = 1;
/// Longest accepted hash suffix
pub const MAX_SUFFIX_LEN: usize = 16;

/// Errors that can occur when loading or validating a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// What to do with element attributes the element's type does not accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownAttributePolicy {
    /// Fail the compile pass
    #[default]
    Reject,
    /// Skip the attribute and log a warning
    Drop,
}

/// Configuration options for a compile pass
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileConfig {
    /// Number of hash symbols appended to every identifier
    pub suffix_len: usize,

    /// Handling of undeclared element attributes
    pub unknown_attributes: UnknownAttributePolicy,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            suffix_len: DEFAULT_SUFFIX_LEN,
            unknown_attributes: UnknownAttributePolicy::Reject,
        }
    }
}

impl CompileConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: CompileConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the hash suffix length
    pub fn with_suffix_len(mut self, len: usize) -> Self {
        self.suffix_len = len;
        self
    }

    /// Set the unknown attribute policy
    pub fn with_unknown_attributes(mut self, policy: UnknownAttributePolicy) -> Self {
        self.unknown_attributes = policy;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SUFFIX_LEN..=MAX_SUFFIX_LEN).contains(&self.suffix_len) {
            return Err(ConfigError::Invalid {
                field: "suffix_len",
                reason: format!(
                    "{} is outside {}..={}",
                    self.suffix_len, MIN_SUFFIX_LEN, MAX_SUFFIX_LEN
                ),
            });
        }
        Ok(())
    }
}
