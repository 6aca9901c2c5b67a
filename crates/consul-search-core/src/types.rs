//! Core types for consul-search-core.
//!
//! This module defines the data shared between the KV adapter, the result
//! cache and the search engine: the fetched [`KvEntry`] and its [`KvValue`],
//! the [`CachePayload`] snapshot, the [`SearchRequest`] and the
//! [`MatchResult`] handed to the renderers.

use serde::{Deserialize, Serialize};

/// A single value stored under a Consul key.
///
/// Values that decode as UTF-8 are kept as text; anything else is preserved
/// verbatim as bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KvValue {
    Text(String),
    Bytes(Vec<u8>),
}

impl KvValue {
    /// Decode raw bytes as UTF-8, falling back to the raw bytes on failure.
    pub fn from_raw(raw: Vec<u8>) -> Self {
        match String::from_utf8(raw) {
            Ok(text) => KvValue::Text(text),
            Err(err) => KvValue::Bytes(err.into_bytes()),
        }
    }
}

/// A key and its (possibly absent) value, as returned by a recursive KV read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvEntry {
    pub key: String,
    pub value: Option<KvValue>,
}

impl KvEntry {
    pub fn new(key: impl Into<String>, value: Option<KvValue>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn text(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, Some(KvValue::Text(value.into())))
    }
}

/// Which part of the KV tree a search looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Keys,
    Values,
}

impl SearchField {
    /// Keys-mode searches only need the key listing, never the values.
    pub fn keys_only(self) -> bool {
        matches!(self, SearchField::Keys)
    }
}

impl std::fmt::Display for SearchField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchField::Keys => write!(f, "keys"),
            SearchField::Values => write!(f, "values"),
        }
    }
}

impl std::str::FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keys" => Ok(SearchField::Keys),
            "values" => Ok(SearchField::Values),
            other => Err(format!("unknown search field {other:?}, expected keys or values")),
        }
    }
}

/// A snapshot of a KV subtree, shaped by the field it was fetched for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "lowercase")]
pub enum CachePayload {
    Keys(Vec<String>),
    Entries(Vec<KvEntry>),
}

impl CachePayload {
    pub fn empty(field: SearchField) -> Self {
        match field {
            SearchField::Keys => CachePayload::Keys(Vec::new()),
            SearchField::Values => CachePayload::Entries(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CachePayload::Keys(keys) => keys.len(),
            CachePayload::Entries(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this payload has the shape a search on `field` expects.
    pub fn fits(&self, field: SearchField) -> bool {
        matches!(
            (self, field),
            (CachePayload::Keys(_), SearchField::Keys)
                | (CachePayload::Entries(_), SearchField::Values)
        )
    }
}

/// One search invocation. Built once at the CLI boundary and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Subtree to fetch; empty means the whole store.
    pub root: String,
    pub field: SearchField,
    pub query: String,
    /// Treat `query` as a regular expression instead of a literal substring.
    pub regex: bool,
    /// Maximum number of results. Zero yields no results.
    pub limit: usize,
}

/// A matching entry, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub key: String,
    /// Present only for values-mode matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Regex capture groups in pattern order. Empty for substring matches.
    #[serde(default)]
    pub groups: Vec<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
