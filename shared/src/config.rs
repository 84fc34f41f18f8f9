use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Rows per list page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Page size used when loading dropdown options.
pub const REFERENCE_PAGE_SIZE: u32 = 1000;
/// Quiet period before a search filter is applied.
pub const SEARCH_DEBOUNCE_MS: u64 = 1000;
/// Name length past which the form shows an advisory warning.
pub const NAME_LENGTH_ADVISORY: usize = 30;

const MAX_PAGE_SIZE: u32 = 1000;
const MAX_DEBOUNCE_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("page size must be between 1 and {max}, got {value}")]
    PageSize { value: u32, max: u32 },

    #[error("reference page size {reference} is smaller than the list page size {page}")]
    ReferencePageSize { reference: u32, page: u32 },

    #[error("search debounce must be between 1 and {max} ms, got {value}")]
    Debounce { value: u64, max: u64 },

    #[error("name length advisory must be positive")]
    NameAdvisory,

    #[error("invalid configuration: {0}")]
    Parse(String),
}

/// Runtime-tunable settings, delivered by the shell through
/// `Event::ConfigLoaded`. Screens pick up new values on their next mount.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct AdminConfig {
    pub page_size: u32,
    pub reference_page_size: u32,
    pub search_debounce_ms: u64,
    pub name_length_advisory: usize,
    /// Jump back to the first page when the sort order changes.
    pub reset_page_on_sort: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            reference_page_size: REFERENCE_PAGE_SIZE,
            search_debounce_ms: SEARCH_DEBOUNCE_MS,
            name_length_advisory: NAME_LENGTH_ADVISORY,
            reset_page_on_sort: false,
        }
    }
}

impl AdminConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::PageSize {
                value: self.page_size,
                max: MAX_PAGE_SIZE,
            });
        }
        if self.reference_page_size < self.page_size {
            return Err(ConfigError::ReferencePageSize {
                reference: self.reference_page_size,
                page: self.page_size,
            });
        }
        if self.search_debounce_ms == 0 || self.search_debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::Debounce {
                value: self.search_debounce_ms,
                max: MAX_DEBOUNCE_MS,
            });
        }
        if self.name_length_advisory == 0 {
            return Err(ConfigError::NameAdvisory);
        }
        Ok(())
    }

    #[must_use]
    pub const fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AdminConfig::default();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.search_debounce(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = AdminConfig::from_json(r#"{"pageSize": 25}"#).unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.reference_page_size, REFERENCE_PAGE_SIZE);
        assert!(!config.reset_page_on_sort);
    }

    #[test]
    fn rejects_zero_page_size() {
        let err = AdminConfig::from_json(r#"{"pageSize": 0}"#).unwrap_err();
        assert_eq!(err, ConfigError::PageSize { value: 0, max: 1000 });
    }

    #[test]
    fn rejects_reference_page_smaller_than_list_page() {
        let config = AdminConfig {
            page_size: 50,
            reference_page_size: 20,
            ..AdminConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ReferencePageSize { .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            AdminConfig::from_json("{"),
            Err(ConfigError::Parse(_))
        ));
    }
}
