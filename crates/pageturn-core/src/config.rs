use crate::{DEFAULT_COUNT_LIMIT, DEFAULT_NAMESPACE};
use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error as ThisError;

const DEFAULT_MAX_SNAPSHOT_BYTES: usize = 64 * 1024;
pub(crate) const DEFAULT_LINK_WINDOW: u32 = 10;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse paging config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid paging config: {0}")]
    Invalid(&'static str),
}

///
/// PagingConfig
///
/// Deployment settings shared by every `PagedQuery` of a process.
///
/// ```toml
/// [paging]
/// namespace = "blog"
/// count_limit = 1000
/// ```
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PagingConfig {
    /// Prefix of every paging cache key.
    pub namespace: String,

    /// Rows scanned at most by `page_count`.
    pub count_limit: u32,

    /// Cache payloads larger than this are treated as malformed.
    pub max_snapshot_bytes: usize,

    /// Default `page_range` for navigation links.
    pub link_window: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            count_limit: DEFAULT_COUNT_LIMIT,
            max_snapshot_bytes: DEFAULT_MAX_SNAPSHOT_BYTES,
            link_window: DEFAULT_LINK_WINDOW,
        }
    }
}

// Other tables of a shared application config are ignored.
#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    paging: PagingConfig,
}

impl PagingConfig {
    /// Parse the `[paging]` table of a TOML document.
    /// A document without the table yields the defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(source)?;
        file.paging.validate()?;

        Ok(file.paging)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::Invalid("namespace must not be empty"));
        }
        if self.count_limit == 0 {
            return Err(ConfigError::Invalid("count_limit must be positive"));
        }
        if self.max_snapshot_bytes == 0 {
            return Err(ConfigError::Invalid("max_snapshot_bytes must be positive"));
        }

        Ok(())
    }

    /// Cache key of the paging snapshot for `query_id`.
    #[must_use]
    pub fn cache_key(&self, query_id: &str) -> String {
        format!("{}:paging:{query_id}", self.namespace)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::{ConfigError, PagingConfig};

    #[test]
    fn missing_table_yields_defaults() {
        let config = PagingConfig::from_toml_str("").expect("empty document should parse");

        assert_eq!(config, PagingConfig::default());
        assert_eq!(config.cache_key("abc"), "pageturn:paging:abc");
    }

    #[test]
    fn partial_table_overrides_only_given_fields() {
        let config = PagingConfig::from_toml_str(
            r#"
            [paging]
            namespace = "he3"
            count_limit = 250
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.namespace, "he3");
        assert_eq!(config.count_limit, 250);
        assert_eq!(config.link_window, PagingConfig::default().link_window);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = PagingConfig::from_toml_str("[paging]\npage_size = 5\n")
            .expect_err("unknown key should fail");

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_count_limit_is_invalid() {
        let err = PagingConfig::from_toml_str("[paging]\ncount_limit = 0\n")
            .expect_err("zero count limit should fail");

        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = PagingConfig::from_path("/nonexistent/pageturn.toml")
            .expect_err("missing file should fail");

        assert!(err.to_string().contains("/nonexistent/pageturn.toml"));
    }
}
