//! Search layer — fetch-or-reuse a KV snapshot, then scan it for matches.
//!
//! A search resolves its snapshot through the [`ResultCache`] first and only
//! falls back to the [`KvSource`] on a miss, storing what it fetched. The
//! snapshot always covers the whole subtree under the request root; the
//! result limit only bounds the scan.

use crate::cache::{cache_key, ResultCache};
use crate::config::{ConsulConfig, Settings};
use crate::error::{CacheError, KvError, SearchError};
use crate::matcher::Matcher;
use crate::types::{CachePayload, MatchResult, SearchRequest};
use std::future::Future;

/// Read access to a KV store.
pub trait KvSource {
    /// Fetch everything under `root` (recursively). With `keys_only` the
    /// payload is [`CachePayload::Keys`], otherwise [`CachePayload::Entries`].
    /// A missing subtree is an empty payload, not an error.
    fn fetch(
        &self,
        root: &str,
        keys_only: bool,
    ) -> impl Future<Output = Result<CachePayload, KvError>> + Send;
}

/// What a search produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    pub matches: Vec<MatchResult>,
    /// Entries that could not be evaluated and were treated as non-matches.
    pub skipped: usize,
    /// Whether the snapshot came from the cache rather than a fresh fetch.
    pub from_cache: bool,
}

/// Orchestrates cache lookup, fetching and matching for one KV target.
pub struct SearchEngine<S> {
    source: S,
    cache: ResultCache,
    consul: ConsulConfig,
}

impl<S: KvSource> SearchEngine<S> {
    pub fn new(settings: &Settings, source: S) -> Self {
        Self::with_cache(
            source,
            ResultCache::new(settings.search.cache.clone()),
            settings.consul.clone(),
        )
    }

    pub fn with_cache(source: S, cache: ResultCache, consul: ConsulConfig) -> Self {
        Self {
            source,
            cache,
            consul,
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Drop every cached snapshot so the next search fetches afresh.
    pub fn clear_cache(&self) -> Result<(), CacheError> {
        self.cache.clear_all()
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, SearchError> {
        let matcher = Matcher::compile(&request.query, request.regex)?;

        if request.limit == 0 {
            tracing::debug!("limit is zero, nothing to search");
            return Ok(SearchOutcome::default());
        }

        let (payload, from_cache) = self.snapshot(request).await?;
        let (matches, skipped) = scan(&payload, &matcher, request.limit);

        if skipped > 0 {
            tracing::info!(skipped, "entries could not be evaluated and were skipped");
        }
        tracing::debug!(
            root = %request.root,
            field = %request.field,
            scanned = payload.len(),
            matched = matches.len(),
            from_cache,
            "search finished"
        );

        Ok(SearchOutcome {
            matches,
            skipped,
            from_cache,
        })
    }

    async fn snapshot(&self, request: &SearchRequest) -> Result<(CachePayload, bool), SearchError> {
        let key = cache_key(&self.consul, &request.root, request.field);

        match self.cache.get(&key)? {
            Some(payload) if payload.fits(request.field) => {
                tracing::debug!(key = %key, items = payload.len(), "cache hit");
                return Ok((payload, true));
            }
            Some(_) => tracing::warn!(key = %key, "cached snapshot has the wrong shape, refetching"),
            None => tracing::debug!(key = %key, "cache miss"),
        }

        let payload = self
            .source
            .fetch(&request.root, request.field.keys_only())
            .await?;
        if !payload.fits(request.field) {
            return Err(KvError::Malformed(format!(
                "expected {} payload for {:?}",
                request.field, request.root
            ))
            .into());
        }
        tracing::debug!(root = %request.root, items = payload.len(), "fetched subtree");

        self.cache.put(&key, &payload, self.consul.cache_ttl)?;
        Ok((payload, false))
    }
}

/// Scan `payload` in stored order, stopping once `limit` matches are found.
/// Returns the matches and the number of entries that had to be skipped.
pub fn scan(payload: &CachePayload, matcher: &Matcher, limit: usize) -> (Vec<MatchResult>, usize) {
    let mut matches = Vec::new();
    let mut skipped = 0;
    if limit == 0 {
        return (matches, skipped);
    }

    match payload {
        CachePayload::Keys(keys) => {
            for key in keys {
                if let Some(hit) = matcher.match_key(key) {
                    matches.push(hit);
                    if matches.len() >= limit {
                        break;
                    }
                }
            }
        }
        CachePayload::Entries(entries) => {
            for entry in entries {
                match matcher.match_entry(entry) {
                    Ok(Some(hit)) => {
                        matches.push(hit);
                        if matches.len() >= limit {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(reason) => {
                        tracing::warn!(key = %entry.key, %reason, "skipping entry");
                        skipped += 1;
                    }
                }
            }
        }
    }

    (matches, skipped)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
