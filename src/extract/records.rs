//! Record-block extraction for listing pages.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

use super::cleanup::clean_text;
use crate::utils::parse_selector_with_fallback;

static IMG_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("img").expect("img selector is valid - this is a programming error")
});

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href]").expect("anchor selector is valid - this is a programming error")
});

/// Digit runs of at least this length are considered embedded numeric ids
/// when matching images to records.
static IMAGE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{3,})").expect("image id regex is valid - this is a programming error")
});

/// One structured item recovered from a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Provider-scoped identifier (numeric id from the URL when the rule
    /// table defines one, otherwise the canonical URL).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Canonical absolute URL; the dedup key.
    pub url: String,
    /// Associated image URL, if one could be recovered.
    pub image: Option<String>,
    /// Additional per-provider fields, keyed by rule name.
    pub extra: BTreeMap<String, String>,
}

/// How to pull one named attribute out of a record block.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    /// Field name in `ExtractedRecord::extra` (ignored for the built-in
    /// name/image rules).
    pub name: &'static str,
    /// Selector scoped to the block; `None` means the block element itself.
    pub selector: Option<&'static str>,
    /// Attribute to read; `None` means the element's text content.
    pub attr: Option<&'static str>,
    /// Optional cleanup step; defaults to entity-decode + whitespace
    /// collapse.
    pub cleanup: Option<fn(&str) -> String>,
}

impl FieldRule {
    /// Applies this rule to a block, returning the cleaned value if the
    /// locator matched and produced non-empty text.
    fn apply(&self, block: ElementRef<'_>) -> Option<String> {
        let element = match self.selector {
            None => block,
            Some(selector_str) => {
                let selector = parse_selector_with_fallback(selector_str, self.name);
                block.select(&selector).next()?
            }
        };
        let raw = match self.attr {
            Some(attr) => element.value().attr(attr)?.to_string(),
            None => element.text().collect::<String>(),
        };
        let cleaned = (self.cleanup.unwrap_or(clean_text))(&raw);
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    }
}

/// Declarative extraction rules for one provider's listing pages.
#[derive(Debug, Clone, Copy)]
pub struct RecordRules {
    /// Base URL used to absolutize hrefs and image sources.
    pub base_url: &'static str,
    /// Selector matching one record block (typically the card anchor).
    pub block_selector: &'static str,
    /// Rule producing the display name; blocks without a name are skipped.
    pub name: FieldRule,
    /// Rule producing the image URL from the block's own markup.
    pub image: Option<FieldRule>,
    /// Additional field rules, emitted into `ExtractedRecord::extra`.
    pub extra: &'static [FieldRule],
    /// URL path prefixes identifying non-product links (navigation,
    /// search, account pages) to discard.
    pub excluded_path_prefixes: &'static [&'static str],
    /// Regex with one capture group extracting the identifier from the
    /// canonical URL; when absent the canonical URL is the identifier.
    pub id_pattern: Option<&'static str>,
}

/// Extracts records from a listing page.
///
/// Scans the page for blocks matching `rules.block_selector`, applies the
/// per-field rules, discards blocks whose link resolves to a known
/// non-product path, and deduplicates on canonical URL keeping the first
/// occurrence, so record order reflects page order. Blocks that lack a
/// resolvable link or a non-empty name are skipped silently.
///
/// When a block's own markup carries no image, falls back to a page-wide
/// id-to-image map (numeric ids embedded in image URLs matched against the
/// record's identifier) before leaving the image `None`.
pub fn extract_records(html: &str, rules: &RecordRules) -> Vec<ExtractedRecord> {
    let document = Html::parse_document(html);
    let block_selector = parse_selector_with_fallback(rules.block_selector, "record block");
    let id_pattern = rules
        .id_pattern
        .and_then(|pattern| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                log::error!("invalid id pattern '{}': {}", pattern, e);
                None
            }
        });

    // Built lazily: most providers carry the image inside the block.
    let mut image_map: Option<HashMap<String, String>> = None;

    let mut seen: HashSet<String> = HashSet::new();
    let mut records = Vec::new();

    for block in document.select(&block_selector) {
        let Some(href) = block_href(block) else {
            continue;
        };
        let Some(canonical) = canonicalize_url(rules.base_url, &href) else {
            continue;
        };
        if is_excluded(&canonical, rules.excluded_path_prefixes) {
            log::debug!("skipping non-product link {}", canonical);
            continue;
        }
        let canonical = canonical.to_string();
        if seen.contains(&canonical) {
            continue;
        }

        let Some(name) = rules.name.apply(block) else {
            continue;
        };

        let id = id_pattern
            .as_ref()
            .and_then(|re| re.captures(&canonical))
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| canonical.clone());

        let mut image = rules
            .image
            .and_then(|rule| rule.apply(block))
            .and_then(|src| canonicalize_url(rules.base_url, &src).map(|url| url.to_string()));
        if image.is_none() {
            let map = image_map
                .get_or_insert_with(|| build_image_map(&document, rules.base_url));
            image = map.get(&id).cloned();
        }

        let mut extra = BTreeMap::new();
        for rule in rules.extra {
            if let Some(value) = rule.apply(block) {
                extra.insert(rule.name.to_string(), value);
            }
        }

        seen.insert(canonical.clone());
        records.push(ExtractedRecord {
            id,
            name,
            url: canonical,
            image,
            extra,
        });
    }

    log::debug!("extracted {} records", records.len());
    records
}

/// Returns the href for a block: the block itself when it is an anchor,
/// otherwise its first descendant anchor.
fn block_href(block: ElementRef<'_>) -> Option<String> {
    if block.value().name() == "a" {
        return block.value().attr("href").map(str::to_string);
    }
    block
        .select(&ANCHOR_SELECTOR)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::to_string)
}

/// Resolves a possibly-relative href against the base URL and normalizes
/// it into the canonical dedup key: fragment stripped, trailing slash
/// dropped (except at the root).
fn canonicalize_url(base: &str, href: &str) -> Option<Url> {
    let base = Url::parse(base).ok()?;
    let mut url = base.join(href.trim()).ok()?;
    url.set_fragment(None);
    if url.path().len() > 1 && url.path().ends_with('/') {
        let trimmed = url.path().trim_end_matches('/').to_string();
        url.set_path(&trimmed);
    }
    Some(url)
}

fn is_excluded(url: &Url, excluded_path_prefixes: &[&str]) -> bool {
    let path = url.path();
    excluded_path_prefixes
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Builds the page-wide id-to-image fallback map: every digit run of three
/// or more characters in an image URL is treated as a candidate record id.
/// First occurrence wins, matching the page's visual order.
fn build_image_map(document: &Html, base_url: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for img in document.select(&IMG_SELECTOR) {
        let Some(src) = img
            .value()
            .attr("src")
            .or_else(|| img.value().attr("data-src"))
        else {
            continue;
        };
        let Some(absolute) = canonicalize_url(base_url, src) else {
            continue;
        };
        for captures in IMAGE_ID_RE.captures_iter(src) {
            map.entry(captures[1].to_string())
                .or_insert_with(|| absolute.to_string());
        }
    }
    map
}
