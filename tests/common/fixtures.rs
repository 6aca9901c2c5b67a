//! KV trees used across harnesses.

use super::fake_consul_api::FakeConsulApi;

/// The two-key database subtree most scenarios search.
pub const DB_TREE: &[(&str, &str)] = &[("app/db/host", "10.0.0.1"), ("app/db/port", "5432")];

/// A broader tree spanning several services and roots.
pub const SERVICE_TREE: &[(&str, &str)] = &[
    ("app/db/host", "10.0.0.1"),
    ("app/db/port", "5432"),
    ("app/cache/host", "10.0.0.7"),
    ("app/cache/port", "6379"),
    ("app/feature/dark_mode", "true"),
    ("svc/auth/issuer", "https://auth.internal"),
    ("svc/auth/port", "8443"),
    ("svc/mail/relay", "smtp.internal:25"),
];

/// Load `tree` into `api` in order.
pub async fn seed(api: &FakeConsulApi, tree: &[(&str, &str)]) {
    for (key, value) in tree {
        api.put(key, value).await;
    }
}

/// A fake API already holding `tree`.
pub async fn api_with(tree: &[(&str, &str)]) -> FakeConsulApi {
    let api = FakeConsulApi::start().await.expect("fake consul api starts");
    seed(&api, tree).await;
    api
}
