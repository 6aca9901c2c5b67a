//! CSV renderer (RFC 4180 quoting).
//!
//! Columns are `key,value,groups`. The value column is empty for keys-mode
//! results; capture groups are joined with `|`.

use consul_search_core::MatchResult;
use std::borrow::Cow;
use std::io::Write;

const HEADER: &str = "key,value,groups";

pub fn render<W: Write>(out: &mut W, results: &[MatchResult]) -> std::io::Result<()> {
    write!(out, "{HEADER}\r\n")?;
    for result in results {
        let value = result.value.as_deref().unwrap_or("");
        let groups = result.groups.join("|");
        write!(
            out,
            "{},{},{}\r\n",
            field(&result.key),
            field(value),
            field(&groups)
        )?;
    }
    Ok(())
}

fn field(raw: &str) -> Cow<'_, str> {
    if raw.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", raw.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(raw)
    }
}
