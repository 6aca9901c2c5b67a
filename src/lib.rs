//! consul_search — search Consul KV keys and values.
//!
//! The binary is a thin shell: [`cli`] parses flags, [`app`] wires settings,
//! the Consul client, the search engine and a renderer together. The actual
//! work lives in the workspace crates:
//!
//! ```text
//! cli ──► app ──► consul-search-core (SearchEngine, ResultCache)
//!                   │            ▲
//!                   ▼            │
//!         consul-search-kv   consul-search-render
//! ```

pub mod app;
pub mod cli;
