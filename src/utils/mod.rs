//! Small shared utilities.

use scraper::Selector;

/// Parses a rule-table selector, degrading to match-nothing on error.
///
/// Provider rule tables carry selectors as plain strings, so a bad
/// selector must not panic mid-scrape: the affected rule simply stops
/// matching and the miss is logged with enough context to find the table
/// entry. `context` names the rule (e.g. "record block", "detail row").
pub(crate) fn parse_selector_with_fallback(selector_str: &str, context: &str) -> Selector {
    Selector::parse(selector_str).unwrap_or_else(|e| {
        log::error!(
            "rule table selector '{}' for {} does not parse ({}); treating it as matching nothing",
            selector_str,
            context,
            e
        );
        Selector::parse("*:not(*)")
            .expect("the match-nothing selector always parses - this is a programming error")
    })
}
