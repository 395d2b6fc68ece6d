//! Namespaced registry keys.
//!
//! Registry keys are the stable string identifiers effect variants are
//! registered under (e.g. `limlib:static`). They are part of the persisted
//! document format, so they are validated on parse and ordered by
//! `(namespace, path)` for deterministic iteration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default namespace used when a key omits an explicit namespace.
pub const DEFAULT_NAMESPACE: &str = "limlib";

const MAX_NAMESPACE_LEN: usize = 64;
const MAX_PATH_LEN: usize = 128;

/// Error returned when parsing an invalid [`RegistryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryKeyError {
    /// The input was empty or whitespace.
    #[error("registry key cannot be empty")]
    Empty,
    /// The namespace component was empty.
    #[error("registry key namespace cannot be empty")]
    EmptyNamespace,
    /// The path component was empty.
    #[error("registry key path cannot be empty")]
    EmptyPath,
    /// A component exceeded its length limit.
    #[error("registry key {component} too long ({len} > {max})")]
    TooLong {
        /// `namespace` or `path`.
        component: &'static str,
        /// Actual length.
        len: usize,
        /// Maximum accepted length.
        max: usize,
    },
    /// A component contained a character outside its charset.
    #[error("registry key {component} has invalid character {found:?} (allowed: {allowed})")]
    InvalidChar {
        /// `namespace` or `path`.
        component: &'static str,
        /// The first offending character.
        found: char,
        /// Human-readable charset description.
        allowed: &'static str,
    },
}

/// A namespaced key of the form `namespace:path`.
///
/// Ordering is lexical by `(namespace, path)` and is stable across runs.
/// Serialized as the `namespace:path` string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegistryKey {
    namespace: String,
    path: String,
}

impl RegistryKey {
    /// Build a key from explicit components.
    pub fn new(namespace: &str, path: &str) -> Result<Self, RegistryKeyError> {
        validate_namespace(namespace)?;
        validate_path(path)?;
        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// Shorthand for a key in the [`DEFAULT_NAMESPACE`].
    pub fn limlib(path: &str) -> Result<Self, RegistryKeyError> {
        Self::new(DEFAULT_NAMESPACE, path)
    }

    /// Parse a registry key.
    ///
    /// Accepts either:
    /// - `namespace:path`
    /// - `path` (uses [`DEFAULT_NAMESPACE`])
    pub fn parse(input: &str) -> Result<Self, RegistryKeyError> {
        Self::parse_with_default_namespace(input, DEFAULT_NAMESPACE)
    }

    /// Parse a registry key using a caller-provided default namespace.
    pub fn parse_with_default_namespace(
        input: &str,
        default_namespace: &str,
    ) -> Result<Self, RegistryKeyError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RegistryKeyError::Empty);
        }

        let (namespace, path) = match input.split_once(':') {
            Some((ns, p)) => (ns, p),
            None => (default_namespace, input),
        };

        Self::new(namespace.trim(), path.trim())
    }

    /// Registry key namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Registry key path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for RegistryKey {
    type Err = RegistryKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RegistryKey {
    type Error = RegistryKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RegistryKey> for String {
    fn from(key: RegistryKey) -> Self {
        key.to_string()
    }
}

fn validate_namespace(ns: &str) -> Result<(), RegistryKeyError> {
    if ns.is_empty() {
        return Err(RegistryKeyError::EmptyNamespace);
    }
    if ns.len() > MAX_NAMESPACE_LEN {
        return Err(RegistryKeyError::TooLong {
            component: "namespace",
            len: ns.len(),
            max: MAX_NAMESPACE_LEN,
        });
    }
    if let Some(found) = ns
        .chars()
        .find(|c| !matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.'))
    {
        return Err(RegistryKeyError::InvalidChar {
            component: "namespace",
            found,
            allowed: "a-z0-9_.-",
        });
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<(), RegistryKeyError> {
    if path.is_empty() {
        return Err(RegistryKeyError::EmptyPath);
    }
    if path.len() > MAX_PATH_LEN {
        return Err(RegistryKeyError::TooLong {
            component: "path",
            len: path.len(),
            max: MAX_PATH_LEN,
        });
    }
    if let Some(found) = path
        .chars()
        .find(|c| !matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.' | '/'))
    {
        return Err(RegistryKeyError::InvalidChar {
            component: "path",
            found,
            allowed: "a-z0-9_./-",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_namespaced_key() {
        let key = RegistryKey::parse("limlib:static").unwrap();
        assert_eq!(key.namespace(), "limlib");
        assert_eq!(key.path(), "static");
        assert_eq!(key.to_string(), "limlib:static");
    }

    #[test]
    fn parses_with_default_namespace() {
        let key = RegistryKey::parse("empty").unwrap();
        assert_eq!(key.to_string(), "limlib:empty");

        let key = RegistryKey::parse_with_default_namespace("fog", "mymod").unwrap();
        assert_eq!(key.to_string(), "mymod:fog");
    }

    #[test]
    fn versioned_paths_are_allowed() {
        let key = RegistryKey::parse("limlib:static/v2").unwrap();
        assert_eq!(key.path(), "static/v2");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(RegistryKey::parse(""), Err(RegistryKeyError::Empty));
        assert_eq!(RegistryKey::parse("   "), Err(RegistryKeyError::Empty));
        assert_eq!(
            RegistryKey::parse("limlib:"),
            Err(RegistryKeyError::EmptyPath)
        );
        assert_eq!(
            RegistryKey::parse(":static"),
            Err(RegistryKeyError::EmptyNamespace)
        );
    }

    #[test]
    fn rejects_invalid_chars() {
        assert!(RegistryKey::parse("limlib:Static").is_err());
        assert!(RegistryKey::parse("LIMLIB:static").is_err());
        assert!(RegistryKey::parse("limlib:static?").is_err());
        assert!(matches!(
            RegistryKey::parse("lim/lib:static"),
            Err(RegistryKeyError::InvalidChar {
                component: "namespace",
                found: '/',
                ..
            })
        ));
    }

    #[test]
    fn rejects_overlong_components() {
        let long = "a".repeat(MAX_PATH_LEN + 1);
        assert!(matches!(
            RegistryKey::limlib(&long),
            Err(RegistryKeyError::TooLong { component: "path", .. })
        ));
    }

    #[test]
    fn orders_by_namespace_then_path() {
        let mut keys = vec![
            RegistryKey::parse("zeta:a").unwrap(),
            RegistryKey::parse("limlib:static").unwrap(),
            RegistryKey::parse("limlib:empty").unwrap(),
        ];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["limlib:empty", "limlib:static", "zeta:a"]);
    }

    #[test]
    fn serializes_as_string() {
        let key = RegistryKey::parse("limlib:static").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"limlib:static\"");
        let back: RegistryKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<RegistryKey>("\"Bad Key\"").is_err());
    }
}
