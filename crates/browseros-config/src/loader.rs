// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./browseros.toml` > `~/.config/browseros/browseros.toml`
//! > `/etc/browseros/browseros.toml`, with environment variable overrides.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::BrowserOsConfig;

/// Prefix shared by every recognized environment variable.
pub const ENV_PREFIX: &str = "BROWSEROS_";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/browseros/browseros.toml` (system-wide)
/// 3. `~/.config/browseros/browseros.toml` (user XDG config)
/// 4. `./browseros.toml` (local directory)
/// 5. `BROWSEROS_*` environment variables
pub fn load_config() -> Result<BrowserOsConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no environment).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<BrowserOsConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BrowserOsConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BrowserOsConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BrowserOsConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(BrowserOsConfig::default()))
        .merge(Toml::file("/etc/browseros/browseros.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("browseros/browseros.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("browseros.toml"))
        .merge(env_provider())
}

/// Recognized environment variables and the config keys they set.
///
/// Only these are read, so unrelated `BROWSEROS_*` variables cannot trip
/// `deny_unknown_fields`.
pub const ENV_VARS: &[(&str, &str)] = &[
    ("BROWSEROS_CHAT_MEMORY_ID", "chat_memory.conversation_id"),
    ("BROWSEROS_CHAT_MEMORY_PATH", "chat_memory.database_path"),
    ("BROWSEROS_CHAT_MEMORY_MAX_TOKENS", "chat_memory.max_tokens"),
    ("BROWSEROS_LOG_LEVEL", "logging.level"),
];

/// Environment variable that sets the dotted config `key`, if any.
pub fn env_var_for(key: &str) -> Option<&'static str> {
    ENV_VARS
        .iter()
        .find(|(_, mapped)| *mapped == key)
        .map(|(var, _)| *var)
}

// Figment hands over the name with the prefix stripped, in either case.
fn key_for_env(stripped: &str) -> Option<&'static str> {
    ENV_VARS
        .iter()
        .find(|(var, _)| var[ENV_PREFIX.len()..].eq_ignore_ascii_case(stripped))
        .map(|(_, key)| *key)
}

/// Environment provider mapping the variables in [`ENV_VARS`] onto config keys.
pub fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX)
        .filter(|name| key_for_env(name.as_str()).is_some())
        .map(|name| match key_for_env(name.as_str()) {
            Some(key) => key.into(),
            None => name.as_str().to_string().into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn env_vars_map_onto_chat_memory_keys() {
        Jail::expect_with(|jail| {
            jail.set_env("BROWSEROS_CHAT_MEMORY_ID", "tab-42");
            jail.set_env("BROWSEROS_CHAT_MEMORY_PATH", "/tmp/chat.sqlite");
            jail.set_env("BROWSEROS_LOG_LEVEL", "debug");

            let config: BrowserOsConfig = Figment::new()
                .merge(Serialized::defaults(BrowserOsConfig::default()))
                .merge(env_provider())
                .extract()?;

            assert_eq!(config.chat_memory.conversation_id(), "tab-42");
            assert_eq!(
                config.chat_memory.database_path.as_deref(),
                Some("/tmp/chat.sqlite")
            );
            assert_eq!(config.logging.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn env_table_maps_both_ways() {
        assert_eq!(
            env_var_for("chat_memory.max_tokens"),
            Some("BROWSEROS_CHAT_MEMORY_MAX_TOKENS")
        );
        assert_eq!(env_var_for("chat_memory.nope"), None);
        assert_eq!(key_for_env("log_level"), Some("logging.level"));
        assert_eq!(key_for_env("LOG_LEVEL"), Some("logging.level"));
    }

    #[test]
    fn unrelated_prefixed_vars_are_ignored() {
        Jail::expect_with(|jail| {
            jail.set_env("BROWSEROS_SOMETHING_ELSE", "x");

            let config: BrowserOsConfig = Figment::new()
                .merge(Serialized::defaults(BrowserOsConfig::default()))
                .merge(env_provider())
                .extract()?;

            assert_eq!(config.chat_memory.conversation_id(), "default");
            Ok(())
        });
    }

    #[test]
    fn env_overrides_config_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
[chat_memory]
conversation_id = "from-file"
max_tokens = 2048
"#,
            )?;
            jail.set_env("BROWSEROS_CHAT_MEMORY_ID", "from-env");

            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.chat_memory.conversation_id(), "from-env");
            assert_eq!(config.chat_memory.max_tokens, 2048);
            Ok(())
        });
    }
}
