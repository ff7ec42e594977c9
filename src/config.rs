//! Runtime configuration for the core library.
//!
//! Values come from the environment (optionally seeded from a `.env` file) or,
//! when the host app initializes the library over the C ABI, from a JSON
//! object with the same field names.

use std::env;

use serde::{Deserialize, Serialize};

use crate::errors::{ServiceError, ServiceResult};
use crate::types::DEFAULT_PAGE_SIZE;

const DEFAULT_CANDIDATE_SEARCH_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Page size applied when a query descriptor does not carry one
    pub default_page_size: u32,
    /// Maximum rows returned by the bulk-task candidate search
    pub candidate_search_limit: usize,
    /// `env_logger` filter directive
    pub log_filter: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            candidate_search_limit: DEFAULT_CANDIDATE_SEARCH_LIMIT,
            log_filter: default_log_filter().to_string(),
        }
    }
}

fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

impl CoreConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> ServiceResult<Self> {
        // A missing .env file is normal outside development
        let _ = dotenv::dotenv();

        let defaults = Self::default();

        let default_page_size = match env::var("AID_CORE_DEFAULT_PAGE_SIZE") {
            Ok(raw) => raw.trim().parse::<u32>().map_err(|_| {
                ServiceError::Configuration(format!(
                    "AID_CORE_DEFAULT_PAGE_SIZE must be a positive integer, got '{}'",
                    raw
                ))
            })?,
            Err(_) => defaults.default_page_size,
        };

        let candidate_search_limit = match env::var("AID_CORE_CANDIDATE_LIMIT") {
            Ok(raw) => raw.trim().parse::<usize>().map_err(|_| {
                ServiceError::Configuration(format!(
                    "AID_CORE_CANDIDATE_LIMIT must be a non-negative integer, got '{}'",
                    raw
                ))
            })?,
            Err(_) => defaults.candidate_search_limit,
        };

        let log_filter = env::var("RUST_LOG").unwrap_or(defaults.log_filter);

        let config = Self {
            default_page_size,
            candidate_search_limit,
            log_filter,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every query fail.
    pub fn validate(&self) -> ServiceResult<()> {
        if self.default_page_size == 0 {
            return Err(ServiceError::Configuration(
                "default_page_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.candidate_search_limit, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: CoreConfig = serde_json::from_str(r#"{"default_page_size": 50}"#).unwrap();
        assert_eq!(config.default_page_size, 50);
        assert_eq!(config.candidate_search_limit, 10);
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let config = CoreConfig {
            default_page_size: 0,
            ..CoreConfig::default()
        };
        assert!(matches!(config.validate(), Err(ServiceError::Configuration(_))));
    }
}
