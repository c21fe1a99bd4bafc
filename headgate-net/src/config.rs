use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::http1::MAX_HEADER_BYTES;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParserConfig {
    /// Most bytes buffered while the end of the header block is still missing.
    pub max_header_bytes: usize,
    /// Authority used to build the URI of an HTTP/1.0 origin-form request
    /// that carries no usable Host header.
    pub fallback_authority: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_header_bytes: MAX_HEADER_BYTES,
            fallback_authority: "localhost".to_string(),
        }
    }
}

impl ParserConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_header_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_header_bytes must be greater than zero".to_string(),
            ));
        }
        if crate::http1::parse_authority(&self.fallback_authority).is_none() {
            return Err(ConfigError::Invalid(format!(
                "fallback_authority `{}` is not a host[:port]",
                self.fallback_authority
            )));
        }
        Ok(())
    }
}
