//! Command-line surface of `consul_search`.

use clap::Parser;
use consul_search_core::{coerce_limit, SearchField, SearchRequest, Settings};
use consul_search_render::Format;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "consul_search",
    version,
    about = "Search Consul KV keys or values by substring or regex"
)]
pub struct Cli {
    /// Config file (TOML, YAML or JSON).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Search root path. Falls back to `search.root`.
    #[arg(short = 't', long)]
    pub root: Option<String>,

    /// Search keys or values.
    #[arg(short, long, default_value = "values")]
    pub fields: SearchField,

    /// Query: a literal substring, or a pattern with --regex.
    #[arg(short, long)]
    pub query: String,

    /// Maximum number of results. Falls back to `search.limit`; zero or
    /// negative returns nothing.
    #[arg(short, long, allow_negative_numbers = true)]
    pub limit: Option<i64>,

    /// Treat the query as a regular expression.
    #[arg(short, long)]
    pub regex: bool,

    /// Drop every cached snapshot before searching.
    #[arg(long)]
    pub clear_cache: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub output: Format,

    /// Never colour plain-text output.
    #[arg(long)]
    pub no_color: bool,

    /// Log at debug level to stderr.
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Combine flags with loaded settings. Flags win; an empty `--root`
    /// defers to the configured root.
    pub fn request(&self, settings: &Settings) -> SearchRequest {
        let root = self
            .root
            .clone()
            .filter(|root| !root.is_empty())
            .unwrap_or_else(|| settings.search.root.clone());

        SearchRequest {
            root,
            field: self.fields,
            query: self.query.clone(),
            regex: self.regex || settings.search.regex,
            limit: coerce_limit(self.limit.unwrap_or(settings.search.limit)),
        }
    }
}
