//! JSON renderer: a pretty-printed array of result objects.

use consul_search_core::MatchResult;
use std::io::Write;

pub fn render<W: Write>(out: &mut W, results: &[MatchResult]) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, results)?;
    writeln!(out)
}
