//! Text cleanup helpers used by field rules.
//!
//! Each helper is a plain `fn(&str) -> String` so rule tables can carry
//! them as data.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").expect("whitespace regex is valid - this is a programming error")
});

static NUMERIC_ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&#(x?[0-9a-fA-F]+);")
        .expect("entity regex is valid - this is a programming error")
});

/// Collapses runs of whitespace (including newlines from pretty-printed
/// markup) to single spaces and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN_RE.replace_all(text.trim(), " ").into_owned()
}

/// Decodes the common HTML entities plus numeric character references.
///
/// The DOM parser already decodes entities in element text and attributes;
/// this is for text pulled out of raw markup fragments (regex captures,
/// inline scripts) where no parser has run.
pub fn decode_entities(text: &str) -> String {
    let text = NUMERIC_ENTITY_RE.replace_all(text, |captures: &regex::Captures<'_>| {
        let body = &captures[1];
        let parsed = if let Some(hex) = body.strip_prefix('x').or_else(|| body.strip_prefix('X')) {
            u32::from_str_radix(hex, 16)
        } else {
            body.parse::<u32>()
        };
        parsed
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| captures[0].to_string())
    });
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
}

/// Standard cleanup applied to extracted field text: entity decode then
/// whitespace collapse.
pub fn clean_text(text: &str) -> String {
    collapse_whitespace(&decode_entities(text))
}

/// Normalizes a detail-page label for synonym lookup: lowercased, trimmed,
/// trailing colon removed.
pub fn normalize_label(label: &str) -> String {
    collapse_whitespace(label)
        .trim_end_matches(':')
        .trim()
        .to_lowercase()
}
