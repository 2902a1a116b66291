//! Cleanup of free-text remarks before they are stored or rendered.
//!
//! The feed occasionally embeds hyperlinks and other markup in remark texts
//! and appends the affected station range in parentheses. [`sanitize`]
//! turns such a remark into a single HTML-safe line of text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A tag with inline text content and its closing tag, e.g. `<a href="..">here</a>`.
    static ref PAIRED_TAG: Regex =
        Regex::new(r"<[a-zA-Z][a-zA-Z0-9]*\b[^<>]*>[^<]*</[a-zA-Z][a-zA-Z0-9]*\s*>").unwrap();
    /// Any leftover opening, closing or self-closing tag, e.g. `<br/>`, together
    /// with the inline text following it up to the next tag.
    static ref COMPACT_TAG: Regex =
        Regex::new(r"</?[a-zA-Z][a-zA-Z0-9]*\b[^<>]*>[^<]*").unwrap();
    /// `(...)` appended after a sentence terminator at the very end.
    static ref TRAILING_STATION_RANGE: Regex = Regex::new(r"(\D)\.\s*\([^()]*\)\s*$").unwrap();
}

/// Returns the canonical display form of a raw remark text.
///
/// Idempotent: `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(raw: &str) -> String {
    let text = remove_matches(raw, &PAIRED_TAG);
    let text = remove_matches(&text, &COMPACT_TAG);

    let text = html_escape::decode_html_entities(&text);
    let text = html_escape::encode_text(&text);

    let text: String = text.chars().filter(|c| !matches!(c, '\n' | '\r')).collect();
    let text = TRAILING_STATION_RANGE.replace(&text, "${1}.");

    text.trim().to_string()
}

/// Copies everything between the matches of `pattern` into a new string.
fn remove_matches(text: &str, pattern: &Regex) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_end = 0;
    for m in pattern.find_iter(text) {
        out.push_str(&text[last_end..m.start()]);
        last_end = m.end();
    }
    out.push_str(&text[last_end..]);
    out
}
