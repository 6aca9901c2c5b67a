//! Match predicate — literal substring or regular expression.

use crate::error::SkipReason;
use crate::types::{KvEntry, KvValue, MatchResult};
use regex::Regex;

/// A compiled query.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Literal containment. Never yields capture groups.
    Substring(String),
    Pattern(Regex),
}

impl Matcher {
    pub fn compile(query: &str, regex: bool) -> Result<Self, regex::Error> {
        if regex {
            Ok(Matcher::Pattern(Regex::new(query)?))
        } else {
            Ok(Matcher::Substring(query.to_string()))
        }
    }

    /// Search `text` anywhere. On a match returns the capture groups in
    /// pattern order; a group that did not participate becomes `""`.
    pub fn find(&self, text: &str) -> Option<Vec<String>> {
        match self {
            Matcher::Substring(needle) => text.contains(needle.as_str()).then(Vec::new),
            Matcher::Pattern(re) if re.captures_len() == 1 => re.is_match(text).then(Vec::new),
            Matcher::Pattern(re) => re.captures(text).map(|caps| {
                caps.iter()
                    .skip(1)
                    .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                    .collect()
            }),
        }
    }

    pub fn match_key(&self, key: &str) -> Option<MatchResult> {
        self.find(key).map(|groups| MatchResult {
            key: key.to_string(),
            value: None,
            groups,
        })
    }

    /// Entries without a value are never matched. Values that are not text
    /// cannot be evaluated and are reported as a [`SkipReason`].
    pub fn match_entry(&self, entry: &KvEntry) -> Result<Option<MatchResult>, SkipReason> {
        let Some(value) = &entry.value else {
            return Ok(None);
        };
        let text = match value {
            KvValue::Text(text) => text,
            KvValue::Bytes(bytes) => {
                return Err(SkipReason::NotText {
                    key: entry.key.clone(),
                    len: bytes.len(),
                })
            }
        };

        Ok(self.find(text).map(|groups| MatchResult {
            key: entry.key.clone(),
            value: Some(text.to_string()),
            groups,
        }))
    }
}
