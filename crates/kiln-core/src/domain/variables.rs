//! Variable maps and literal substitution.
//!
//! Two independent [`VariableMap`]s exist per materialization: path variables
//! (applied to directory and file names) and content variables (handed to
//! content processors). The same [`VariableSubstitutor`] primitive serves
//! both.

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};

use crate::domain::error::DomainError;

/// Compiled-size ceiling for the key alternation (the `regex` default).
const REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Mapping from variable name to value. Keys are unique; inserting an
/// existing key replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableMap(BTreeMap<String, String>);

impl VariableMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Merge `other` into `self`; values from `other` win.
    pub fn merge(&mut self, other: &VariableMap) {
        for (key, value) in other.iter() {
            self.0.insert(key.to_owned(), value.to_owned());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariableMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for VariableMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

/// Exact-match, single-pass literal replacement over a closed variable map.
///
/// All keys are compiled into one alternation. Alternatives are ordered
/// longest first so that when one key is a prefix of another at the same
/// position the longer key wins. Replacement values are never re-scanned.
#[derive(Debug, Clone)]
pub struct VariableSubstitutor {
    pattern: Option<Regex>,
    variables: VariableMap,
}

impl VariableSubstitutor {
    /// Compile `variables` into a substitutor.
    ///
    /// # Errors
    ///
    /// [`DomainError::VariablePattern`] if the combined pattern exceeds the
    /// regex size limit. Escaped literals are otherwise always valid.
    pub fn new(variables: &VariableMap) -> Result<Self, DomainError> {
        let mut keys: Vec<&str> = variables.keys().filter(|k| !k.is_empty()).collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let pattern = if keys.is_empty() {
            None
        } else {
            let alternation = keys
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            Some(Self::compile(&alternation, keys.len(), REGEX_SIZE_LIMIT)?)
        };

        Ok(Self {
            pattern,
            variables: variables.clone(),
        })
    }

    fn compile(alternation: &str, keys: usize, size_limit: usize) -> Result<Regex, DomainError> {
        RegexBuilder::new(alternation)
            .size_limit(size_limit)
            .build()
            .map_err(|e| DomainError::VariablePattern {
                keys,
                reason: e.to_string(),
            })
    }

    /// Replace every non-overlapping key occurrence, scanning left to right.
    pub fn replace(&self, text: &str) -> String {
        match &self.pattern {
            None => text.to_owned(),
            Some(pattern) => pattern
                .replace_all(text, |caps: &regex::Captures<'_>| {
                    let key = &caps[0];
                    self.variables.get(key).unwrap_or(key).to_owned()
                })
                .into_owned(),
        }
    }

    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }
}
