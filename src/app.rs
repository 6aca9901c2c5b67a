//! Orchestration boundary: settings → engine → renderer.
//!
//! This is where search failures stop. A search that cannot complete is
//! logged and rendered as an empty result list; only problems that prevent a
//! search from starting (bad config, bad Consul target) bubble up to `main`.

use crate::cli::Cli;
use anyhow::Context;
use consul_search_core::{KvSource, SearchEngine, SearchError, SearchOutcome, SearchRequest, Settings};
use consul_search_kv::ConsulClient;
use consul_search_render::{render, Format, RenderOptions};
use std::io::Write;

/// Run one CLI invocation, writing rendered results to `out`. Returns the
/// number of results written.
pub async fn run<W: Write>(cli: &Cli, out: &mut W, color: bool) -> anyhow::Result<usize> {
    let settings = Settings::load(cli.config.as_deref()).context("loading configuration")?;
    let client = ConsulClient::new(&settings.consul).context("configuring the Consul client")?;
    let engine = SearchEngine::new(&settings, client);
    let request = cli.request(&settings);

    tracing::debug!(
        consul = %engine.source().base_url(),
        cache = %engine.cache().db_path().display(),
        ?request,
        "starting search"
    );

    execute(
        &engine,
        cli.clear_cache,
        &request,
        out,
        cli.output,
        RenderOptions {
            color: color && !cli.no_color,
        },
    )
    .await
}

/// Search with `engine` and render the outcome. Search failures are logged
/// and produce an empty result list.
pub async fn execute<S: KvSource, W: Write>(
    engine: &SearchEngine<S>,
    clear_cache: bool,
    request: &SearchRequest,
    out: &mut W,
    format: Format,
    options: RenderOptions,
) -> anyhow::Result<usize> {
    let matches = match search(engine, clear_cache, request).await {
        Ok(outcome) => outcome.matches,
        Err(err) => {
            tracing::error!(error = %err, "search failed");
            Vec::new()
        }
    };

    render(out, format, &matches, options).context("writing results")?;
    out.flush()?;
    Ok(matches.len())
}

async fn search<S: KvSource>(
    engine: &SearchEngine<S>,
    clear_cache: bool,
    request: &SearchRequest,
) -> Result<SearchOutcome, SearchError> {
    if clear_cache {
        engine.clear_cache()?;
        tracing::info!("cache cleared");
    }
    engine.search(request).await
}
