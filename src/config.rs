// In: src/config.rs

//! The single source of truth for all spikepack codec configuration.
//!
//! A `CodecConfig` is created once at the application boundary (defaults, a
//! JSON file passed to the CLI, or a literal in tests) and handed to both the
//! `StreamEncoder` and the `StreamDecoder`. The two sides must agree on
//! `cache_size`: it decides which ranks exist, and the wire format does not
//! carry it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpikepackError};
use crate::kernels::marker::MARKER_MAX_COUNT;

//==================================================================================
// I. The Unified CodecConfig
//==================================================================================

/// Tuning knobs shared by the encoder and the decoder.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CodecConfig {
    /// Capacity of the frequency cache. Large enough by default to hold every
    /// value a typical recording visits, so evictions are rare.
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// **The lookahead buffer capacity.** Samples are buffered until this many
    /// are pending, then flushed as segments. Also bounds the longest coded run,
    /// so it must fit in a marker.
    #[serde(default = "default_encoded_seq_max_len")]
    pub encoded_seq_max_len: usize,

    /// Upper bound on a single literal run. Kept small so the encoder retries
    /// the cache often.
    #[serde(default = "default_not_encoded_seq_max_len")]
    pub not_encoded_seq_max_len: usize,

    /// If true, `StreamEncoder::finish` terminates the stream with the reserved
    /// all-zero marker word. Decoders accept streams with or without it.
    #[serde(default)]
    pub write_end_marker: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            cache_size: default_cache_size(),
            encoded_seq_max_len: default_encoded_seq_max_len(),
            not_encoded_seq_max_len: default_not_encoded_seq_max_len(),
            write_end_marker: false,
        }
    }
}

impl CodecConfig {
    /// Checks the bounds every other component relies on.
    pub fn validate(&self) -> Result<()> {
        if self.cache_size == 0 {
            return Err(SpikepackError::InvalidConfig(
                "cache_size must be at least 1".to_string(),
            ));
        }
        check_run_limit("encoded_seq_max_len", self.encoded_seq_max_len)?;
        check_run_limit("not_encoded_seq_max_len", self.not_encoded_seq_max_len)?;
        Ok(())
    }

    /// Parses and validates a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CodecConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

fn check_run_limit(name: &str, value: usize) -> Result<()> {
    if value == 0 || value > MARKER_MAX_COUNT {
        return Err(SpikepackError::InvalidConfig(format!(
            "{} must be in [1, {}], got {}",
            name, MARKER_MAX_COUNT, value
        )));
    }
    Ok(())
}

/// Helper for `serde` to provide a default for `cache_size`.
fn default_cache_size() -> usize {
    1 << 10
}

/// Helper for `serde` to provide a default for `encoded_seq_max_len`.
fn default_encoded_seq_max_len() -> usize {
    MARKER_MAX_COUNT
}

/// Helper for `serde` to provide a default for `not_encoded_seq_max_len`.
fn default_not_encoded_seq_max_len() -> usize {
    (1 << 7) - 1
}

//==================================================================================
// II. Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CodecConfig::default();
        assert_eq!(config.cache_size, 1024);
        assert_eq!(config.encoded_seq_max_len, 8191);
        assert_eq!(config.not_encoded_seq_max_len, 127);
        assert!(!config.write_end_marker);
        config.validate().unwrap();
    }

    #[test]
    fn test_json_partial_config_uses_defaults() {
        let config = CodecConfig::from_json_str(r#"{ "cache_size": 128 }"#).unwrap();
        assert_eq!(config.cache_size, 128);
        assert_eq!(config.not_encoded_seq_max_len, 127);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let err = CodecConfig::from_json_str(r#"{ "cache_size": 0 }"#).unwrap_err();
        assert!(matches!(err, SpikepackError::InvalidConfig(_)));

        let config = CodecConfig {
            encoded_seq_max_len: MARKER_MAX_COUNT + 1,
            ..CodecConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("encoded_seq_max_len"));

        let config = CodecConfig {
            not_encoded_seq_max_len: 0,
            ..CodecConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_serde_error() {
        let err = CodecConfig::from_json_str("{ cache_size: ").unwrap_err();
        assert!(matches!(err, SpikepackError::SerdeJson(_)));
    }
}
