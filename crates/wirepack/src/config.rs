//! # Decode limits
//!
//! Resource bounds applied to untrusted input. A [`Limits`] value is handed
//! to each decoder explicitly and stays read-only for the decoder's
//! lifetime; there is no process-wide limit state.
//!
//! ## Sources
//! - [`Limits::default`]
//! - TOML via [`Limits::from_toml`]
//! - Environment via [`Limits::from_env`] (`WIREPACK_MAX_DEPTH`,
//!   `WIREPACK_MAX_LENGTH`)

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Default container nesting bound.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Default bound on any declared length; the format maximum.
pub const DEFAULT_MAX_LENGTH: usize = u32::MAX as usize;

pub const ENV_MAX_DEPTH: &str = "WIREPACK_MAX_DEPTH";
pub const ENV_MAX_LENGTH: &str = "WIREPACK_MAX_LENGTH";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to parse limits: {0}")]
    Parse(String),

    #[error("invalid limits: {0}")]
    Invalid(String),
}

/// Bounds enforced while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Limits {
    /// Deepest container nesting accepted. `[]` has depth 1, `[[]]` depth 2.
    ///
    /// Decoding, encoding, dropping, equality and hashing of arrays do not
    /// recurse, so any depth is safe for them. `Clone`, `Debug` and
    /// `Value::to_json` do recurse; raise the default only when those are
    /// kept off deep values.
    pub max_depth: usize,

    /// Largest declared length accepted for strings, binaries, extensions,
    /// arrays (elements) and maps (pairs).
    pub max_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl Limits {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Parses limits from TOML; missing fields take their defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let limits = toml::from_str::<Self>(content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        limits.validate()?;
        debug!(
            max_depth = limits.max_depth,
            max_length = limits.max_length,
            "loaded decode limits from toml"
        );
        Ok(limits)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup`. Unparseable values are ignored with a
    /// warning.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut limits = Self::default();
        if let Some(raw) = lookup(ENV_MAX_DEPTH) {
            match raw.trim().parse::<usize>() {
                Ok(val) => limits.max_depth = val,
                Err(e) => warn!(key = ENV_MAX_DEPTH, value = %raw, error = %e, "ignoring override"),
            }
        }
        if let Some(raw) = lookup(ENV_MAX_LENGTH) {
            match raw.trim().parse::<usize>() {
                Ok(val) => limits.max_length = val,
                Err(e) => warn!(key = ENV_MAX_LENGTH, value = %raw, error = %e, "ignoring override"),
            }
        }
        limits.validate()?;
        debug!(
            max_depth = limits.max_depth,
            max_length = limits.max_length,
            "loaded decode limits from environment"
        );
        Ok(limits)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_depth must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_fills_missing_fields() {
        let limits = Limits::from_toml("max_depth = 8").unwrap();
        assert_eq!(limits.max_depth, 8);
        assert_eq!(limits.max_length, DEFAULT_MAX_LENGTH);

        let limits = Limits::from_toml("").unwrap();
        assert_eq!(limits, Limits::default());
    }

    #[test]
    fn toml_rejects_zero_depth_and_garbage() {
        assert!(matches!(
            Limits::from_toml("max_depth = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Limits::from_toml("max_depth = \"deep\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn toml_roundtrip() {
        let limits = Limits::default().with_max_depth(3).with_max_length(1024);
        let text = limits.to_toml().unwrap();
        assert_eq!(Limits::from_toml(&text).unwrap(), limits);
    }

    #[test]
    fn lookup_overrides_and_ignores_bad_values() {
        let limits = Limits::from_lookup(|key| match key {
            ENV_MAX_DEPTH => Some("16".to_string()),
            ENV_MAX_LENGTH => Some("lots".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(limits.max_depth, 16);
        assert_eq!(limits.max_length, DEFAULT_MAX_LENGTH);

        assert!(Limits::from_lookup(|key| (key == ENV_MAX_DEPTH).then(|| "0".to_string())).is_err());
    }
}
