//! Engine configuration loaded from TOML.
//!
//! # Responsibility
//! - Describe the knobs a deployment may set: uid mode, inbox name,
//!   paranoid checking and serialization limits.
//! - Reject values the engine cannot honor before any document is touched.
//!
//! # Invariants
//! - Every field has a default; an empty TOML document is a valid config.
//! - Unknown keys are rejected rather than ignored.

use crate::codec::SerializationConfig;
use crate::model::naming::validate_name;
use crate::uid::UidMode;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

/// Name given to the inbox of a freshly created document.
pub const DEFAULT_INBOX_NAME: &str = "inbox";

const MAX_COMPRESSION_LEVEL: u32 = 9;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    CompressionLevel(u32),
    MaxPayloadBytes,
    InboxName(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "cannot read config: {err}"),
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::CompressionLevel(level) => write!(
                f,
                "compression_level must be between 0 and {MAX_COMPRESSION_LEVEL}, got {level}"
            ),
            Self::MaxPayloadBytes => write!(f, "max_payload_bytes must be positive"),
            Self::InboxName(name) => write!(f, "`{name}` cannot be used as the inbox name"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Top-level engine settings.
///
/// ```toml
/// uid_mode = "sequential"
/// inbox_name = "inbox"
/// paranoid = true
///
/// [serialization]
/// compression_level = 2
/// max_payload_bytes = 67108864
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub uid_mode: UidMode,
    pub inbox_name: String,
    /// Check well-formedness after every executed command.
    pub paranoid: bool,
    pub serialization: SerializationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            uid_mode: UidMode::default(),
            inbox_name: DEFAULT_INBOX_NAME.to_string(),
            paranoid: false,
            serialization: SerializationConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.serialization.compression_level;
        if level > MAX_COMPRESSION_LEVEL {
            return Err(ConfigError::CompressionLevel(level));
        }
        if self.serialization.max_payload_bytes == 0 {
            return Err(ConfigError::MaxPayloadBytes);
        }
        if validate_name(&self.inbox_name).is_err() {
            return Err(ConfigError::InboxName(self.inbox_name.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, EngineConfig, DEFAULT_INBOX_NAME};
    use crate::uid::UidMode;

    #[test]
    fn empty_document_yields_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.inbox_name, DEFAULT_INBOX_NAME);
        assert_eq!(config.uid_mode, UidMode::Random);
    }

    #[test]
    fn nested_serialization_table_is_read() {
        let config = EngineConfig::from_toml_str(
            "uid_mode = \"sequential\"\nparanoid = true\n[serialization]\ncompression_level = 0\n",
        )
        .unwrap();
        assert_eq!(config.uid_mode, UidMode::Sequential);
        assert!(config.paranoid);
        assert_eq!(config.serialization.compression_level, 0);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = EngineConfig::from_toml_str("[serialization]\ncompression_level = 12\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::CompressionLevel(12)));

        let err = EngineConfig::from_toml_str("inbox_name = \"uid=5\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InboxName(_)));

        let err = EngineConfig::from_toml_str("colour = \"red\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
