//! Configuration file parsing for `sift.toml`.
//!
//! ```toml
//! [evaluator]
//! include_strategy = "cached"   # or "direct"
//!
//! [logging]
//! level = "${SIFT_LEVEL}"
//! format = "compact"
//! ```
//!
//! `${VAR}` references are expanded from the environment before parsing.
//! `SIFT_INCLUDE_STRATEGY` overrides the strategy when
//! [`SiftConfig::with_env_overrides`] is applied.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};
use crate::evaluator::IncludeStrategy;

/// Main configuration structure for `sift.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SiftConfig {
    /// Specification evaluator settings.
    #[serde(default)]
    pub evaluator: EvaluatorConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Specification evaluator settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluatorConfig {
    /// How include translations are obtained.
    #[serde(default)]
    pub include_strategy: IncludeStrategy,
}

/// Logging settings, used by [`crate::logging::init_from_config`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format (json, pretty, compact).
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

fn default_format() -> String {
    "json".to_string()
}

impl SiftConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            QueryError::configuration(format!("cannot read {}: {}", path.display(), e)).with_source(e)
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> QueryResult<Self> {
        let expanded = expand_env_vars(content);
        toml::from_str(&expanded).map_err(|e| {
            QueryError::configuration(format!("invalid sift.toml: {}", e.message())).with_source(e)
        })
    }

    /// Apply overrides from `SIFT_*` environment variables.
    pub fn with_env_overrides(mut self) -> QueryResult<Self> {
        if let Ok(strategy) = std::env::var("SIFT_INCLUDE_STRATEGY") {
            self.evaluator.include_strategy = strategy.parse()?;
        }
        Ok(self)
    }

    /// The configured include strategy.
    pub fn include_strategy(&self) -> IncludeStrategy {
        self.evaluator.include_strategy
    }
}

/// Expand environment variables in the format `${VAR_NAME}`.
///
/// Unset variables are left as written.
fn expand_env_vars(content: &str) -> String {
    let re = match regex_lite::Regex::new(r"\$\{([^}]+)\}") {
        Ok(re) => re,
        Err(_) => return content.to_string(),
    };

    re.replace_all(content, |caps: &regex_lite::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SiftConfig::default();
        assert_eq!(config.include_strategy(), IncludeStrategy::Cached);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [evaluator]
            include_strategy = "direct"

            [logging]
            level = "debug"
        "#;

        let config = SiftConfig::from_str(toml).unwrap();
        assert_eq!(config.include_strategy(), IncludeStrategy::Direct);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        assert_eq!(SiftConfig::from_str("").unwrap(), SiftConfig::default());
    }

    #[test]
    fn test_rejects_unknown_strategy() {
        let err = SiftConfig::from_str("[evaluator]\ninclude_strategy = \"lazy\"").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn test_rejects_unknown_section() {
        assert!(SiftConfig::from_str("[database]\nurl = \"x\"").is_err());
    }

    #[test]
    fn test_env_var_expansion() {
        // SAFETY: the variable name is unique to this test.
        unsafe {
            std::env::set_var("SIFT_TEST_CONFIG_FORMAT", "compact");
        }
        let expanded = expand_env_vars("format = \"${SIFT_TEST_CONFIG_FORMAT}\" # ${SIFT_TEST_UNSET_VAR}");
        assert_eq!(expanded, "format = \"compact\" # ${SIFT_TEST_UNSET_VAR}");
        unsafe {
            std::env::remove_var("SIFT_TEST_CONFIG_FORMAT");
        }
    }

    #[test]
    fn test_env_override() {
        // SAFETY: no other test reads SIFT_INCLUDE_STRATEGY.
        unsafe {
            std::env::set_var("SIFT_INCLUDE_STRATEGY", "direct");
        }
        let config = SiftConfig::default().with_env_overrides();
        unsafe {
            std::env::remove_var("SIFT_INCLUDE_STRATEGY");
        }
        assert_eq!(config.unwrap().include_strategy(), IncludeStrategy::Direct);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[evaluator]\ninclude_strategy = \"direct\"").unwrap();

        let config = SiftConfig::from_file(file.path()).unwrap();
        assert_eq!(config.include_strategy(), IncludeStrategy::Direct);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SiftConfig::from_file(dir.path().join("sift.toml")).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
        assert!(err.message.contains("cannot read"));
    }
}
