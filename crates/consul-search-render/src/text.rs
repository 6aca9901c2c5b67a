//! Plain-text renderer: one line per match.
//!
//! ```text
//! app/db/host = 10.0.0.1
//! app/db/port  (db, port)
//! ```

use consul_search_core::MatchResult;
use crossterm::style::Stylize;
use std::io::Write;

pub fn render<W: Write>(out: &mut W, results: &[MatchResult], color: bool) -> std::io::Result<()> {
    for result in results {
        if color {
            write!(out, "{}", result.key.as_str().cyan().bold())?;
        } else {
            write!(out, "{}", result.key)?;
        }

        if let Some(value) = &result.value {
            write!(out, " = {value}")?;
        }

        if !result.groups.is_empty() {
            let groups = result.groups.join(", ");
            if color {
                write!(out, "  ({})", groups.as_str().dark_grey())?;
            } else {
                write!(out, "  ({groups})")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rendered(results: &[MatchResult], color: bool) -> String {
        let mut buf = Vec::new();
        render(&mut buf, results, color).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn keys_values_and_groups() {
        let results = vec![
            MatchResult {
                key: "app/db/host".into(),
                value: Some("10.0.0.1".into()),
                groups: vec![],
            },
            MatchResult {
                key: "app/db/port".into(),
                value: None,
                groups: vec!["db".into(), "port".into()],
            },
        ];
        assert_eq!(
            rendered(&results, false),
            "app/db/host = 10.0.0.1\napp/db/port  (db, port)\n"
        );
    }

    #[test]
    fn color_wraps_key_in_escape_codes() {
        let results = vec![MatchResult {
            key: "app/db/host".into(),
            value: None,
            groups: vec![],
        }];
        let out = rendered(&results, true);
        assert!(out.contains("\u{1b}["));
        assert!(out.contains("app/db/host"));
    }

    #[test]
    fn nothing_for_no_results() {
        assert_eq!(rendered(&[], false), "");
    }
}
