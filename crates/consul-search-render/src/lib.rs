//! consul-search-render — output formats for search results.
//!
//! The engine hands over an ordered `[MatchResult]`; this crate turns it into
//! plain text lines, a JSON array or CSV rows. Renderers write to any
//! [`std::io::Write`] so the binary can target stdout and tests a buffer.

pub mod csv;
pub mod json;
pub mod text;

use consul_search_core::MatchResult;
use std::io::Write;

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    #[default]
    Text,
    Json,
    Csv,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Text => write!(f, "text"),
            Format::Json => write!(f, "json"),
            Format::Csv => write!(f, "csv"),
        }
    }
}

/// Render options that only some formats honour.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Colour keys in plain-text output.
    pub color: bool,
}

pub fn render<W: Write>(
    out: &mut W,
    format: Format,
    results: &[MatchResult],
    options: RenderOptions,
) -> std::io::Result<()> {
    match format {
        Format::Text => text::render(out, results, options.color),
        Format::Json => json::render(out, results),
        Format::Csv => csv::render(out, results),
    }
}
