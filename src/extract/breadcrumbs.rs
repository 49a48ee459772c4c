//! Breadcrumb/category trail extraction.

use std::collections::HashSet;

use scraper::Html;

use super::cleanup::clean_text;
use crate::utils::parse_selector_with_fallback;

/// Rules for walking a provider's breadcrumb container.
#[derive(Debug, Clone, Copy)]
pub struct BreadcrumbRules {
    /// Selector for the navigation container holding the trail.
    pub container: &'static str,
    /// Entries that are navigation chrome rather than categories, matched
    /// case-insensitively ("home", "accueil").
    pub excluded: &'static [&'static str],
}

/// Collects the category trail from a breadcrumb container.
///
/// Walks anchors in document order, cleans their text, drops known
/// non-category entries, and deduplicates while preserving order. Returns
/// an empty vector when the container is absent; the caller decides whether
/// that matters for the page type.
pub fn extract_breadcrumbs(html: &str, rules: &BreadcrumbRules) -> Vec<String> {
    let document = Html::parse_document(html);
    let container_selector = parse_selector_with_fallback(rules.container, "breadcrumb container");
    let anchor_selector = parse_selector_with_fallback("a", "breadcrumb anchor");

    let mut seen: HashSet<String> = HashSet::new();
    let mut trail = Vec::new();

    for container in document.select(&container_selector) {
        for anchor in container.select(&anchor_selector) {
            let text = clean_text(&anchor.text().collect::<String>());
            if text.is_empty() {
                continue;
            }
            let lowered = text.to_lowercase();
            if rules
                .excluded
                .iter()
                .any(|excluded| excluded.eq_ignore_ascii_case(&lowered))
            {
                continue;
            }
            if seen.insert(lowered) {
                trail.push(text);
            }
        }
    }

    trail
}
