//! Coleka provider (collectibles database, coleka.com).
//!
//! Coleka sits behind a Cloudflare-style interstitial and serves both
//! search listings (item cards) and detail pages with attribute tables,
//! breadcrumb categories and free-text checklist fields like
//! "1 à 100, 105, HS1".

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use super::{page_title, ItemDetail};
use crate::cache::ResultCache;
use crate::challenge::{
    classify_with, solve_by_revisit, ChallengeState, ChallengeStrategy, MarkerRules,
};
use crate::config::{CallOptions, NOT_FOUND_MIN_HTML_LEN};
use crate::enumeration::Enumeration;
use crate::error_handling::ScrapeError;
use crate::extract::{
    extract_breadcrumbs, extract_detail_fields, extract_records, BreadcrumbRules, DetailRules,
    ExtractedRecord, FieldRule, PairShape, RecordRules,
};
use crate::fetch::ProxyFetcher;
use crate::orchestrate::{PageKind, ScrapeTarget, Scraper};

const BASE_URL: &str = "https://www.coleka.com";

/// Markers for listing pages; no length heuristic since an empty search
/// result page is legitimately short.
const LISTING_MARKERS: MarkerRules = MarkerRules {
    challenge_markers: &[
        "just a moment",
        "cf-chl",
        "challenge-platform",
        "turnstile",
        "vérifiez que vous êtes humain",
        "verify you are human",
    ],
    blocked_markers: &["you have been blocked", "access denied"],
    not_found_markers: &[],
    min_page_len: 0,
};

/// Markers for detail pages; real item pages are always substantial, so
/// the length heuristic applies.
const DETAIL_MARKERS: MarkerRules = MarkerRules {
    challenge_markers: LISTING_MARKERS.challenge_markers,
    blocked_markers: LISTING_MARKERS.blocked_markers,
    not_found_markers: &["page introuvable", "cette page n'existe pas", "erreur 404"],
    min_page_len: NOT_FOUND_MIN_HTML_LEN,
};

const RECORD_RULES: RecordRules = RecordRules {
    base_url: BASE_URL,
    block_selector: "a.item-bloc",
    name: FieldRule {
        name: "name",
        selector: Some("span.item-titre"),
        attr: None,
        cleanup: None,
    },
    image: Some(FieldRule {
        name: "image",
        selector: Some("img"),
        attr: Some("src"),
        cleanup: None,
    }),
    extra: &[FieldRule {
        name: "series",
        selector: Some("span.item-serie"),
        attr: None,
        cleanup: None,
    }],
    excluded_path_prefixes: &["/search", "/recherche", "/account", "/connexion", "/aide"],
    // Item URLs end in a slug like .../optimus-prime-r12345.
    id_pattern: Some(r"-r(\d+)$"),
};

const DETAIL_RULES: DetailRules = DetailRules {
    shapes: &[
        PairShape {
            row: "table.fiche-infos tr",
            label: "th",
            value: "td",
        },
        PairShape {
            row: "dl.fiche-infos div",
            label: "dt",
            value: "dd",
        },
        PairShape {
            row: "div.info-ligne",
            label: "span.info-label",
            value: "span.info-valeur",
        },
    ],
    synonyms: &[
        ("marque", "brand"),
        ("brand", "brand"),
        ("fabricant", "brand"),
        ("gamme", "series"),
        ("série", "series"),
        ("series", "series"),
        ("année", "year"),
        ("year", "year"),
        ("référence", "reference"),
        ("reference", "reference"),
        ("numéros", "checklist"),
        ("numeros", "checklist"),
        ("checklist", "checklist"),
        ("pays", "country"),
        ("country", "country"),
    ],
};

const BREADCRUMB_RULES: BreadcrumbRules = BreadcrumbRules {
    container: "nav.fil-ariane",
    excluded: &["home", "accueil"],
};

/// Coleka's challenge mechanics: the interstitial clears itself when its
/// scripts get enough settle time, so solving is a patient revisit of the
/// localized home page.
pub struct ColekaStrategy;

#[async_trait]
impl ChallengeStrategy for ColekaStrategy {
    fn classify(&self, html: &str) -> ChallengeState {
        classify_with(&LISTING_MARKERS, html)
    }

    fn classify_detail(&self, html: &str) -> ChallengeState {
        classify_with(&DETAIL_MARKERS, html)
    }

    async fn solve(
        &self,
        fetcher: &ProxyFetcher,
        session_id: &str,
        lang: &str,
    ) -> Result<bool, ScrapeError> {
        let home = format!("{BASE_URL}/{lang}");
        solve_by_revisit(fetcher, session_id, &home, &LISTING_MARKERS).await
    }
}

/// Scraping operations for coleka.com.
pub struct ColekaProvider {
    scraper: Scraper,
    cache: Arc<dyn ResultCache>,
}

impl ColekaProvider {
    /// Creates the provider over a shared scraper and cache.
    pub fn new(scraper: Scraper, cache: Arc<dyn ResultCache>) -> Self {
        ColekaProvider { scraper, cache }
    }

    /// Searches the catalogue, returning item records in page order.
    ///
    /// Zero results is a valid outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns `ScrapeError::RetriesExhausted` wrapping the last attempt's
    /// cause if the site could not be scraped.
    pub async fn search(
        &self,
        query: &str,
        options: &CallOptions,
    ) -> Result<Vec<ExtractedRecord>, ScrapeError> {
        let lang = options.lang();
        let cache_key = format!("coleka:search:{lang}:{query}");
        if let Some(cached) = self.cache.get(&cache_key) {
            if let Ok(records) = serde_json::from_str::<Vec<ExtractedRecord>>(&cached) {
                log::debug!("cache hit for {}", cache_key);
                return Ok(records);
            }
        }

        let url = search_url(query, lang)?;
        let home = format!("{BASE_URL}/{lang}");
        let strategy = ColekaStrategy;
        let mut target = ScrapeTarget::new("coleka-search", url.as_str(), &strategy);
        target.home_url = Some(&home);
        target.lang = lang;
        target.kind = PageKind::Listing;
        target.home_options = options.fetch_options();
        target.target_options = options.fetch_options();
        target.max_attempts = options.max_attempts();

        let records = self
            .scraper
            .scrape(&target, |html| Ok(extract_records(html, &RECORD_RULES)))
            .await?;

        if let Ok(json) = serde_json::to_string(&records) {
            self.cache.set(&cache_key, json, None);
        }
        Ok(records)
    }

    /// Fetches one item's detail page and recovers its attributes,
    /// category trail and checklist.
    ///
    /// `item_path` is the site-relative path of the item (as found in a
    /// search record's URL).
    ///
    /// # Errors
    ///
    /// Returns `ScrapeError::RetriesExhausted`; a final cause of
    /// `ResourceNotFound` means the item does not exist (callers map it
    /// to a 404).
    pub async fn item_detail(
        &self,
        item_path: &str,
        options: &CallOptions,
    ) -> Result<ItemDetail, ScrapeError> {
        let lang = options.lang();
        let cache_key = format!("coleka:item:{lang}:{item_path}");
        if let Some(cached) = self.cache.get(&cache_key) {
            if let Ok(detail) = serde_json::from_str::<ItemDetail>(&cached) {
                log::debug!("cache hit for {}", cache_key);
                return Ok(detail);
            }
        }

        let url = item_url(item_path)?;
        let home = format!("{BASE_URL}/{lang}");
        let strategy = ColekaStrategy;
        let mut target = ScrapeTarget::new("coleka-item", url.as_str(), &strategy);
        target.home_url = Some(&home);
        target.lang = lang;
        target.kind = PageKind::Detail;
        target.home_options = options.fetch_options();
        target.target_options = options.fetch_options();
        target.max_attempts = options.max_attempts();

        let page_url = url.to_string();
        let detail = self
            .scraper
            .scrape(&target, move |html| {
                let fields = extract_detail_fields(html, &DETAIL_RULES);
                let categories = extract_breadcrumbs(html, &BREADCRUMB_RULES);
                // A real detail page always carries at least one field; an
                // empty yield on a clean page means the markup drifted.
                if fields.is_empty() && categories.is_empty() {
                    return Err(ScrapeError::Extraction(format!(
                        "detail page {page_url} yielded no fields"
                    )));
                }
                let checklist = fields
                    .get("checklist")
                    .map(|raw| Enumeration::parse_mixed(raw));
                Ok(ItemDetail {
                    name: page_title(html),
                    url: page_url.clone(),
                    fields,
                    categories,
                    checklist,
                })
            })
            .await?;

        if let Ok(json) = serde_json::to_string(&detail) {
            self.cache.set(&cache_key, json, None);
        }
        Ok(detail)
    }
}

fn search_url(query: &str, lang: &str) -> Result<Url, ScrapeError> {
    let mut url = Url::parse(BASE_URL)
        .and_then(|base| base.join(&format!("{lang}/search")))
        .map_err(|e| ScrapeError::Extraction(format!("bad search url: {e}")))?;
    url.query_pairs_mut().append_pair("q", query);
    Ok(url)
}

fn item_url(item_path: &str) -> Result<Url, ScrapeError> {
    Url::parse(BASE_URL)
        .and_then(|base| base.join(item_path))
        .map_err(|e| ScrapeError::Extraction(format!("bad item path '{item_path}': {e}")))
}
