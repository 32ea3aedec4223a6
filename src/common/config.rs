use std::str::FromStr;

use crate::common::error::ConfigError;

const MAX_BLOB_LEN_VAR: &str = "ROWSTORE_MAX_BLOB_LEN";
const DEFAULT_PAGE_SIZE_VAR: &str = "ROWSTORE_DEFAULT_PAGE_SIZE";
const MAX_PAGE_SIZE_VAR: &str = "ROWSTORE_MAX_PAGE_SIZE";

/// Tunables for a [`TableRegistry`](crate::TableRegistry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Largest blob, in bytes, accepted on submit. `None` means unlimited.
    pub max_blob_len: Option<usize>,

    /// Rows returned by a fetch that does not specify a limit.
    pub default_page_size: usize,

    /// Upper clamp applied to every fetch limit.
    pub max_page_size: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_blob_len: None,
            default_page_size: 100,
            max_page_size: 1000,
        }
    }
}

impl RegistryConfig {
    pub fn with_max_blob_len(mut self, limit: usize) -> Self {
        self.max_blob_len = Some(limit);
        self
    }

    pub fn with_page_sizes(mut self, default: usize, max: usize) -> Result<Self, ConfigError> {
        self.default_page_size = default;
        self.max_page_size = max;
        self.validate()?;
        Ok(self)
    }

    /// Reads overrides from `ROWSTORE_*` environment variables.
    ///
    /// Unset variables keep their default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(limit) = parse_var(&lookup, MAX_BLOB_LEN_VAR)? {
            config.max_blob_len = Some(limit);
        }
        if let Some(size) = parse_var(&lookup, DEFAULT_PAGE_SIZE_VAR)? {
            config.default_page_size = size;
        }
        if let Some(size) = parse_var(&lookup, MAX_PAGE_SIZE_VAR)? {
            config.max_page_size = size;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ConfigError::PageSize {
                default: self.default_page_size,
                max: self.max_page_size,
            });
        }
        Ok(())
    }

    /// Resolves a caller-supplied fetch limit against the configured page sizes.
    pub(crate) fn page_size(&self, limit: Option<usize>) -> usize {
        limit
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&'static str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };

    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::Invalid { var, value: raw })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn lookup_from(pairs: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> = pairs
            .iter()
            .map(|(k, v)| (*k, (*v).to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = RegistryConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, RegistryConfig::default());
    }

    #[test]
    fn test_reads_overrides() {
        let config = RegistryConfig::from_lookup(lookup_from(&[
            (MAX_BLOB_LEN_VAR, "1024"),
            (DEFAULT_PAGE_SIZE_VAR, " 10 "),
            (MAX_PAGE_SIZE_VAR, "50"),
        ]))
        .unwrap();

        assert_eq!(config.max_blob_len, Some(1024));
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.max_page_size, 50);
    }

    #[test]
    fn test_rejects_unparsable_value() {
        let err = RegistryConfig::from_lookup(lookup_from(&[(MAX_BLOB_LEN_VAR, "lots")]))
            .unwrap_err();

        assert_eq!(
            err,
            ConfigError::Invalid {
                var: MAX_BLOB_LEN_VAR,
                value: "lots".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_inverted_page_sizes() {
        let err = RegistryConfig::default().with_page_sizes(20, 10).unwrap_err();
        assert_eq!(err, ConfigError::PageSize { default: 20, max: 10 });
    }

    #[test]
    fn test_page_size_clamps() {
        let config = RegistryConfig::default().with_page_sizes(5, 10).unwrap();

        assert_eq!(config.page_size(None), 5);
        assert_eq!(config.page_size(Some(3)), 3);
        assert_eq!(config.page_size(Some(500)), 10);
    }
}
