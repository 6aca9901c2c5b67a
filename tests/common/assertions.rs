//! Assertion macros for search results.
//!
//! These wrap `pretty_assertions` and print the full result list on failure
//! so it is obvious which keys were (or were not) matched.

/// Assert that a result list contains exactly these keys, in order.
///
/// ```rust
/// assert_result_keys!(outcome.matches, ["app/db/host", "app/db/port"]);
/// ```
#[macro_export]
macro_rules! assert_result_keys {
    ($results:expr, [$($key:expr),* $(,)?]) => {{
        let results: &[consul_search_core::MatchResult] = &$results;
        let actual: Vec<&str> = results.iter().map(|r| r.key.as_str()).collect();
        let expected: Vec<&str> = vec![$($key),*];
        pretty_assertions::assert_eq!(
            actual, expected,
            "assert_result_keys! failed, full results: {:#?}", results
        );
    }};
}

/// Assert that no result exceeds the given limit.
#[macro_export]
macro_rules! assert_within_limit {
    ($results:expr, $limit:expr) => {{
        let results: &[consul_search_core::MatchResult] = &$results;
        let limit: usize = $limit;
        if results.len() > limit {
            panic!(
                "assert_within_limit! failed: {} results for limit {}:\n{:#?}",
                results.len(),
                limit,
                results
            );
        }
    }};
}
