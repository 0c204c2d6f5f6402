//! Text-layout helpers for DSL emission: escaping, number formatting,
//! and the inline-vs-block decision.

use serde_json::Number;

/// Rendered length at or under this fits on one line.
pub(crate) const INLINE_LIMIT: usize = 60;

/// Escape `\`, `"`, and the control characters the DSL spells.
pub(crate) fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

pub(crate) fn quote(text: &str) -> String {
    format!("\"{}\"", escape_string(text))
}

/// Integers render as integers; anything with a fractional component
/// keeps its decimal spelling (`1.0` stays `1.0`).
pub(crate) fn number_to_text(number: &Number) -> String {
    number.to_string()
}

/// Lay out already-rendered entries inside delimiters: one line when
/// everything fits under the soft threshold, otherwise a block with
/// two-space indentation and newline separators.
pub(crate) fn layout(open: char, close: char, entries: &[String], indent: usize) -> String {
    if entries.is_empty() {
        return format!("{}{}", open, close);
    }

    let has_breaks = entries.iter().any(|entry| entry.contains('\n'));
    let inline_len: usize =
        entries.iter().map(|entry| entry.len()).sum::<usize>() + 2 * entries.len() + 2;
    if !has_breaks && inline_len <= INLINE_LIMIT {
        return format!("{}{}{}", open, entries.join(", "), close);
    }

    let inner_pad = "  ".repeat(indent + 1);
    let close_pad = "  ".repeat(indent);
    let body = entries
        .iter()
        .map(|entry| format!("{}{}", inner_pad, entry))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n{}\n{}{}", open, body, close_pad, close)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_round() {
        assert_eq!(escape_string("a\"b\\c\nd"), "a\\\"b\\\\c\\nd");
        assert_eq!(quote("hi"), "\"hi\"");
    }

    #[test]
    fn test_number_spelling() {
        assert_eq!(number_to_text(&Number::from(42)), "42");
        assert_eq!(number_to_text(&Number::from(-7)), "-7");
        let one = Number::from_f64(1.0).unwrap();
        assert_eq!(number_to_text(&one), "1.0");
    }

    #[test]
    fn test_layout_inline() {
        let entries = vec!["a: 1".to_string(), "b: 2".to_string()];
        assert_eq!(layout('{', '}', &entries, 0), "{a: 1, b: 2}");
    }

    #[test]
    fn test_layout_block_when_long() {
        let entries = vec![
            "first: \"a rather long value that will not fit\"".to_string(),
            "second: \"another long value pushing us over\"".to_string(),
        ];
        let rendered = layout('{', '}', &entries, 0);
        assert!(rendered.starts_with("{\n  first:"));
        assert!(rendered.ends_with("\n}"));
    }

    #[test]
    fn test_layout_empty() {
        assert_eq!(layout('{', '}', &[], 0), "{}");
        assert_eq!(layout('[', ']', &[], 1), "[]");
    }
}
