// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty identifiers and a usable token budget.

use crate::diagnostic::ConfigError;
use crate::model::BrowserOsConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &BrowserOsConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if let Some(id) = &config.chat_memory.conversation_id
        && id.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "chat_memory.conversation_id must not be empty".to_string(),
        });
    }

    if let Some(path) = &config.chat_memory.database_path
        && path.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "chat_memory.database_path must not be empty".to_string(),
        });
    }

    if config.chat_memory.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "chat_memory.max_tokens must be greater than zero".to_string(),
        });
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of: {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&BrowserOsConfig::default()).is_ok());
    }

    #[test]
    fn empty_identifiers_are_rejected() {
        let mut config = BrowserOsConfig::default();
        config.chat_memory.conversation_id = Some("  ".into());
        config.chat_memory.database_path = Some(String::new());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].to_string().contains("conversation_id"));
        assert!(errors[1].to_string().contains("database_path"));
    }

    #[test]
    fn zero_budget_and_bad_level_are_both_reported() {
        let mut config = BrowserOsConfig::default();
        config.chat_memory.max_tokens = 0;
        config.logging.level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = BrowserOsConfig::default();
        config.logging.level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
    }
}
