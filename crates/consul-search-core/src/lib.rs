//! consul-search-core — search and cache engine for Consul KV.
//!
//! # Architecture
//!
//! ```text
//! SearchEngine ──(miss)──► KvSource ──► ResultCache::put
//!      │                                     │
//!      └──(hit)──◄── ResultCache::get ◄──────┘
//!      │
//!      └──► Matcher scan ──► Vec<MatchResult>
//! ```
//!
//! The engine is generic over [`KvSource`]; the HTTP implementation lives in
//! `consul-search-kv`. Settings are an explicit [`Settings`] value passed in
//! at construction, never global state.

pub mod cache;
pub mod config;
pub mod error;
pub mod matcher;
pub mod search;
pub mod types;

pub use cache::{cache_key, ResultCache};
pub use config::{coerce_limit, Settings};
pub use error::{CacheError, KvError, SearchError, SkipReason};
pub use matcher::Matcher;
pub use search::{KvSource, SearchEngine, SearchOutcome};
pub use types::{CachePayload, KvEntry, KvValue, MatchResult, SearchField, SearchRequest};
