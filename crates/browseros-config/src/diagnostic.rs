// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment extraction failures into miette diagnostics.
//!
//! Values can come from one of the TOML files or from a `BROWSEROS_*`
//! variable. Every diagnostic names where the offending value was set; file
//! origins also get a labeled span on the key.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use std::fmt;

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::loader::env_var_for;

/// Source name used for configuration parsed from a string.
pub const INLINE_SOURCE: &str = "<inline>";

/// Jaro-Winkler score a known key must beat to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Where a configuration value was set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// A TOML file (or [`INLINE_SOURCE`]).
    File(String),
    /// A recognized environment variable.
    Env(&'static str),
    Unknown,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::File(path) => write!(f, "set in {path}"),
            Origin::Env(var) => write!(f, "set by environment variable `{var}`"),
            Origin::Unknown => f.write_str("origin unknown"),
        }
    }
}

/// A configuration problem, rendered by [`render_errors`].
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {}", section_label(.section.as_deref()))]
    #[diagnostic(
        code(browseros::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Table holding the key; `None` for the top level.
        section: Option<String>,
        /// Closest known key, if one is close enough.
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("invalid value for `{key}`: {detail}")]
    #[diagnostic(code(browseros::config::invalid_value), help("{origin}"))]
    InvalidValue {
        /// Dotted key, e.g. `chat_memory.max_tokens`.
        key: String,
        detail: String,
        origin: Origin,
        #[label("expected {expected}")]
        span: Option<SourceSpan>,
        expected: String,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A parsed value that breaks a constraint.
    #[error("validation error: {message}")]
    #[diagnostic(code(browseros::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(browseros::config::other))]
    Other(String),
}

fn section_label(section: Option<&str>) -> String {
    match section {
        Some(name) => format!("[{name}]"),
        None => "the top level".to_string(),
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(key) => format!("did you mean `{key}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert every error inside a `figment::Error` into a [`ConfigError`].
///
/// `toml_sources` pairs each loaded file path (or [`INLINE_SOURCE`]) with its
/// content, for span lookup.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| convert(&error, toml_sources))
        .collect()
}

fn convert(error: &figment::Error, toml_sources: &[(String, String)]) -> ConfigError {
    let path: Vec<&str> = error.path.iter().map(String::as_str).collect();
    match &error.kind {
        Kind::UnknownField(field, expected) => {
            // The path may or may not end with the rejected key itself.
            let section = match path.split_last() {
                Some((last, rest)) if last == field => rest.first(),
                _ => path.first(),
            }
            .map(|s| s.to_string());
            let (span, src) = match file_source(error, toml_sources) {
                Some((name, content)) => (
                    locate_key(content, section.as_deref(), field),
                    Some(NamedSource::new(name, content.to_string())),
                ),
                None => (None, None),
            };
            ConfigError::UnknownKey {
                key: field.clone(),
                section,
                suggestion: closest_key(field, expected).map(str::to_string),
                valid_keys: expected.join(", "),
                span,
                src,
            }
        }
        Kind::InvalidType(actual, expected) => {
            let key = path.join(".");
            let origin = origin_of(error, &key, toml_sources);
            let (span, src) = match (&origin, file_source(error, toml_sources)) {
                (Origin::File(_), Some((name, content))) => {
                    let (section, field) = match path.split_last() {
                        Some((field, rest)) => (rest.first().copied(), *field),
                        None => (None, ""),
                    };
                    (
                        locate_key(content, section, field),
                        Some(NamedSource::new(name, content.to_string())),
                    )
                }
                _ => (None, None),
            };
            ConfigError::InvalidValue {
                key,
                detail: format!("found {actual}"),
                origin,
                span,
                expected: expected.to_string(),
                src,
            }
        }
        _ => ConfigError::Other(error.to_string()),
    }
}

/// Environment variables are merged last, so a set variable always wins.
fn origin_of(error: &figment::Error, key: &str, toml_sources: &[(String, String)]) -> Origin {
    if let Some(var) = env_var_for(key)
        && std::env::var_os(var).is_some()
    {
        return Origin::Env(var);
    }
    match file_source(error, toml_sources) {
        Some((name, _)) => Origin::File(name.to_string()),
        None => Origin::Unknown,
    }
}

/// The loaded TOML text the error's value came from.
fn file_source<'a>(
    error: &figment::Error,
    toml_sources: &'a [(String, String)],
) -> Option<(&'a str, &'a str)> {
    let wanted = match error.metadata.as_ref().and_then(|m| m.source.as_ref()) {
        Some(figment::Source::File(path)) => path.display().to_string(),
        _ => INLINE_SOURCE.to_string(),
    };
    toml_sources
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(name, content)| (name.as_str(), content.as_str()))
}

/// Span of `key` inside table `section` (`None` for the top level).
///
/// Only simple `key = value` lines are recognized; dotted and quoted keys
/// yield `None`.
pub fn locate_key(content: &str, section: Option<&str>, key: &str) -> Option<SourceSpan> {
    let mut offset = 0;
    let mut current: Option<&str> = None;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if let Some(header) = trimmed.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
            current = Some(header.trim());
        } else if current == section {
            let indent = line.len() - line.trim_start().len();
            if let Some(rest) = line[indent..].strip_prefix(key)
                && rest.trim_start().starts_with('=')
            {
                return Some(SourceSpan::new((offset + indent).into(), key.len()));
            }
        }
        offset += line.len();
    }
    None
}

/// Known key closest to `unknown`, if any scores above the threshold.
pub fn closest_key<'a>(unknown: &str, known: &[&'a str]) -> Option<&'a str> {
    known
        .iter()
        .map(|&candidate| (strsim::jaro_winkler(unknown, candidate), candidate))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate)
}

/// Print each error to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAT_MEMORY_KEYS: &[&str] = &["conversation_id", "database_path", "max_tokens"];

    #[test]
    fn typos_get_the_nearest_key() {
        assert_eq!(
            closest_key("conversaton_id", CHAT_MEMORY_KEYS),
            Some("conversation_id")
        );
        assert_eq!(
            closest_key("database_pth", CHAT_MEMORY_KEYS),
            Some("database_path")
        );
        assert_eq!(closest_key("max_tokns", CHAT_MEMORY_KEYS), Some("max_tokens"));
    }

    #[test]
    fn unrelated_keys_get_no_suggestion() {
        assert_eq!(closest_key("zzzzzz", CHAT_MEMORY_KEYS), None);
    }

    #[test]
    fn key_is_located_only_inside_its_section() {
        let content = "[logging]\nmax_tokns = 1\n\n[chat_memory]\n  max_tokns = 10\n";
        let span = locate_key(content, Some("chat_memory"), "max_tokns").unwrap();
        assert_eq!(
            &content[span.offset()..span.offset() + span.len()],
            "max_tokns"
        );
        assert_eq!(span.offset(), content.rfind("max_tokns").unwrap());

        assert!(locate_key(content, Some("chat_memory"), "level").is_none());
        assert!(locate_key(content, None, "max_tokns").is_none());
    }

    #[test]
    fn key_prefix_is_not_a_match() {
        let content = "[chat_memory]\nmax_tokens_total = 1\nmax_tokens = 2\n";
        let span = locate_key(content, Some("chat_memory"), "max_tokens").unwrap();
        assert_eq!(span.offset(), content.find("max_tokens =").unwrap());
    }

    #[test]
    fn origins_describe_themselves() {
        assert_eq!(
            Origin::Env("BROWSEROS_LOG_LEVEL").to_string(),
            "set by environment variable `BROWSEROS_LOG_LEVEL`"
        );
        assert_eq!(
            Origin::File("/etc/browseros/browseros.toml".into()).to_string(),
            "set in /etc/browseros/browseros.toml"
        );
    }

    #[test]
    fn unknown_key_message_names_the_section() {
        let error = ConfigError::UnknownKey {
            key: "max_tokns".into(),
            section: Some("chat_memory".into()),
            suggestion: Some("max_tokens".into()),
            valid_keys: CHAT_MEMORY_KEYS.join(", "),
            span: None,
            src: None,
        };
        assert_eq!(
            error.to_string(),
            "unknown key `max_tokns` in [chat_memory]"
        );
        let help = error.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.starts_with("did you mean `max_tokens`?"));
    }
}
