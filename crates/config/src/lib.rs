//! Configuration for the mcfunction toolchain.
//!
//! A [`Config`] is read from a JSON file (or taken from [`Config::default`])
//! and handed to the analyzer and the CLI. Every section is optional in the
//! file; missing sections and fields fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Schema version written by [`Config::default`].
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Errors that can occur when loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON deserialization failed.
    #[error("invalid config JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field value is out of its valid range.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// The name of the field that failed validation.
        field: String,
        /// A human-readable explanation of why the field value is invalid.
        reason: String,
    },
}

/// Top-level configuration.
///
/// # Example
/// ```
/// let cfg = mcfunction_toolchain_config::load_config_from_str(
///     r#"{ "limits": { "max_nbt_depth": 64 } }"#,
/// ).unwrap();
/// assert_eq!(cfg.limits.max_nbt_depth, 64);
/// assert_eq!(cfg.suggestions.max_results, 100);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Config schema version for forward compatibility.
    pub schema_version: String,
    /// Directory holding the persisted command data mirror.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    /// Engine limits.
    pub limits: Limits,
    /// Completion settings.
    pub suggestions: Suggestions,
    /// Logging settings.
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.into(),
            cache_dir: None,
            limits: Limits::default(),
            suggestions: Suggestions::default(),
            log: Log::default(),
        }
    }
}

/// Resource limits applied while parsing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Limits {
    /// Lines longer than this many characters are not analyzed.
    pub max_line_length: usize,
    /// Maximum nesting depth of structured data values.
    pub max_nbt_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_line_length: 32_500,
            max_nbt_depth: 512,
        }
    }
}

/// Completion settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Suggestions {
    /// Maximum number of suggestions returned for one query.
    pub max_results: usize,
}

impl Default for Suggestions {
    fn default() -> Self {
        Self { max_results: 100 }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Log {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            filter: "warn".into(),
        }
    }
}

fn positive(field: &str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidField {
            field: field.into(),
            reason: "must be > 0".into(),
        });
    }
    Ok(())
}

/// Load and validate a [`Config`] from a JSON string.
///
/// Performs structural validation after deserialization:
/// - `schema_version` must be non-empty
/// - `limits.max_line_length`, `limits.max_nbt_depth` and
///   `suggestions.max_results` must be > 0
/// - `log.filter` must be non-empty
pub fn load_config_from_str(s: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(s)?;
    validate(&config)?;
    Ok(config)
}

/// Check the invariants of a [`Config`] built in code.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.schema_version.trim().is_empty() {
        return Err(ConfigError::InvalidField {
            field: "schema_version".into(),
            reason: "must not be empty".into(),
        });
    }
    positive("limits.max_line_length", config.limits.max_line_length)?;
    positive("limits.max_nbt_depth", config.limits.max_nbt_depth)?;
    positive("suggestions.max_results", config.suggestions.max_results)?;
    if config.log.filter.trim().is_empty() {
        return Err(ConfigError::InvalidField {
            field: "log.filter".into(),
            reason: "must not be empty".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let cfg = load_config_from_str("{}").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.limits.max_nbt_depth, 512);
        assert_eq!(cfg.log.filter, "warn");
    }

    #[test]
    fn load_full_config() {
        let json = r#"{
            "schema_version": "1.0.0",
            "cache_dir": ".mcfn-cache",
            "limits": { "max_line_length": 1000, "max_nbt_depth": 32 },
            "suggestions": { "max_results": 10 },
            "log": { "filter": "mcfunction_toolchain_core=debug" }
        }"#;
        let cfg = load_config_from_str(json).unwrap();
        assert_eq!(cfg.cache_dir, Some(PathBuf::from(".mcfn-cache")));
        assert_eq!(cfg.limits.max_line_length, 1000);
        assert_eq!(cfg.limits.max_nbt_depth, 32);
        assert_eq!(cfg.suggestions.max_results, 10);
        assert_eq!(cfg.log.filter, "mcfunction_toolchain_core=debug");
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = load_config_from_str(r#"{ "limits": { "max_line_length": 80 } }"#).unwrap();
        assert_eq!(cfg.limits.max_line_length, 80);
        assert_eq!(cfg.limits.max_nbt_depth, Limits::default().max_nbt_depth);
    }

    #[test]
    fn zero_limits_rejected() {
        let err = load_config_from_str(r#"{ "limits": { "max_nbt_depth": 0 } }"#).unwrap_err();
        assert!(err.to_string().contains("limits.max_nbt_depth"), "{err}");
        let err = load_config_from_str(r#"{ "suggestions": { "max_results": 0 } }"#).unwrap_err();
        assert!(err.to_string().contains("suggestions.max_results"), "{err}");
    }

    #[test]
    fn empty_schema_version_rejected() {
        let err = load_config_from_str(r#"{ "schema_version": " " }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { .. }));
    }

    #[test]
    fn malformed_json_rejected() {
        let err = load_config_from_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidJson(_)));
    }

    #[test]
    fn default_round_trips_through_json() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert_eq!(load_config_from_str(&json).unwrap(), Config::default());
    }
}
