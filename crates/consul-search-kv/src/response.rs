//! Decoding of Consul `/v1/kv` response bodies.
//!
//! A recursive read returns `[{"Key": "...", "Value": "<base64>|null", ...}]`;
//! a keys-only read returns `["key", ...]`. Everything except `Key` and
//! `Value` (indices, flags, sessions) is ignored.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use consul_search_core::{KvEntry, KvError, KvValue};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawEntry {
    key: String,
    #[serde(default)]
    value: Option<String>,
}

pub fn decode_keys(body: &[u8]) -> Result<Vec<String>, KvError> {
    if body.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_slice::<Option<Vec<String>>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|err| KvError::Malformed(err.to_string()))
}

pub fn decode_entries(body: &[u8]) -> Result<Vec<KvEntry>, KvError> {
    if body.is_empty() {
        return Ok(Vec::new());
    }
    let raw: Vec<RawEntry> = serde_json::from_slice::<Option<Vec<RawEntry>>>(body)
        .map_err(|err| KvError::Malformed(err.to_string()))?
        .unwrap_or_default();

    raw.into_iter()
        .map(|entry| {
            let value = entry
                .value
                .map(|encoded| {
                    STANDARD.decode(encoded.as_bytes()).map_err(|err| {
                        KvError::Malformed(format!("value of {} is not base64: {err}", entry.key))
                    })
                })
                .transpose()?
                .map(KvValue::from_raw);
            Ok(KvEntry {
                key: entry.key,
                value,
            })
        })
        .collect()
}
