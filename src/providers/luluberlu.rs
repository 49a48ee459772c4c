//! Lulu-Berlu provider (vintage toy shop, luluberlu.com).
//!
//! Smaller surface than Coleka: search listings of shop articles and
//! detail pages with a brand/series attribute list. The site fronts its
//! catalogue with the same family of interstitial, solved by a patient
//! revisit of the shop home.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use super::{page_title, ItemDetail};
use crate::cache::ResultCache;
use crate::challenge::{
    classify_with, solve_by_revisit, ChallengeState, ChallengeStrategy, MarkerRules,
};
use crate::config::{CallOptions, NOT_FOUND_MIN_HTML_LEN};
use crate::error_handling::ScrapeError;
use crate::extract::{
    extract_breadcrumbs, extract_detail_fields, extract_records, BreadcrumbRules, DetailRules,
    ExtractedRecord, FieldRule, PairShape, RecordRules,
};
use crate::fetch::ProxyFetcher;
use crate::orchestrate::{PageKind, ScrapeTarget, Scraper};

const BASE_URL: &str = "https://www.luluberlu.com";

const LISTING_MARKERS: MarkerRules = MarkerRules {
    challenge_markers: &[
        "just a moment",
        "cf-chl",
        "challenge-platform",
        "verify you are human",
        "un instant",
    ],
    blocked_markers: &["you have been blocked", "access denied"],
    not_found_markers: &[],
    min_page_len: 0,
};

const DETAIL_MARKERS: MarkerRules = MarkerRules {
    challenge_markers: LISTING_MARKERS.challenge_markers,
    blocked_markers: LISTING_MARKERS.blocked_markers,
    not_found_markers: &["article introuvable", "erreur 404"],
    min_page_len: NOT_FOUND_MIN_HTML_LEN,
};

const RECORD_RULES: RecordRules = RecordRules {
    base_url: BASE_URL,
    block_selector: "div.produit-vignette",
    name: FieldRule {
        name: "name",
        selector: Some("span.produit-nom"),
        attr: None,
        cleanup: None,
    },
    image: Some(FieldRule {
        name: "image",
        selector: Some("img"),
        attr: Some("data-src"),
        cleanup: None,
    }),
    extra: &[FieldRule {
        name: "price",
        selector: Some("span.produit-prix"),
        attr: None,
        cleanup: None,
    }],
    excluded_path_prefixes: &["/recherche", "/panier", "/compte", "/contact"],
    // Article URLs carry a numeric id segment: .../article-4521.html
    id_pattern: Some(r"article-(\d+)"),
};

const DETAIL_RULES: DetailRules = DetailRules {
    shapes: &[
        PairShape {
            row: "ul.caracteristiques li",
            label: "span.caracteristique-nom",
            value: "span.caracteristique-valeur",
        },
        PairShape {
            row: "table.article-infos tr",
            label: "td.label",
            value: "td.valeur",
        },
    ],
    synonyms: &[
        ("marque", "brand"),
        ("fabricant", "brand"),
        ("gamme", "series"),
        ("série", "series"),
        ("année", "year"),
        ("état", "condition"),
        ("etat", "condition"),
        ("référence", "reference"),
    ],
};

const BREADCRUMB_RULES: BreadcrumbRules = BreadcrumbRules {
    container: "div.chemin-navigation",
    excluded: &["home", "accueil", "catalogue"],
};

/// Lulu-Berlu's challenge mechanics.
pub struct LuluBerluStrategy;

#[async_trait]
impl ChallengeStrategy for LuluBerluStrategy {
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
        _lang: &str,
    ) -> Result<bool, ScrapeError> {
        // The shop is French-only; language does not change the home URL.
        solve_by_revisit(fetcher, session_id, BASE_URL, &LISTING_MARKERS).await
    }
}

/// Scraping operations for luluberlu.com.
pub struct LuluBerluProvider {
    scraper: Scraper,
    cache: Arc<dyn ResultCache>,
}

impl LuluBerluProvider {
    /// Creates the provider over a shared scraper and cache.
    pub fn new(scraper: Scraper, cache: Arc<dyn ResultCache>) -> Self {
        LuluBerluProvider { scraper, cache }
    }

    /// Searches the shop catalogue, returning article records in page
    /// order. Zero results is a valid outcome, not an error.
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
        let cache_key = format!("luluberlu:search:{query}");
        if let Some(cached) = self.cache.get(&cache_key) {
            if let Ok(records) = serde_json::from_str::<Vec<ExtractedRecord>>(&cached) {
                log::debug!("cache hit for {}", cache_key);
                return Ok(records);
            }
        }

        let url = search_url(query)?;
        let strategy = LuluBerluStrategy;
        let mut target = ScrapeTarget::new("luluberlu-search", url.as_str(), &strategy);
        target.home_url = Some(BASE_URL);
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

    /// Fetches one article's detail page.
    ///
    /// # Errors
    ///
    /// Returns `ScrapeError::RetriesExhausted`; a final cause of
    /// `ResourceNotFound` means the article does not exist.
    pub async fn item_detail(
        &self,
        article_path: &str,
        options: &CallOptions,
    ) -> Result<ItemDetail, ScrapeError> {
        let cache_key = format!("luluberlu:item:{article_path}");
        if let Some(cached) = self.cache.get(&cache_key) {
            if let Ok(detail) = serde_json::from_str::<ItemDetail>(&cached) {
                log::debug!("cache hit for {}", cache_key);
                return Ok(detail);
            }
        }

        let url = Url::parse(BASE_URL)
            .and_then(|base| base.join(article_path))
            .map_err(|e| {
                ScrapeError::Extraction(format!("bad article path '{article_path}': {e}"))
            })?;
        let strategy = LuluBerluStrategy;
        let mut target = ScrapeTarget::new("luluberlu-item", url.as_str(), &strategy);
        target.home_url = Some(BASE_URL);
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
                if fields.is_empty() && categories.is_empty() {
                    return Err(ScrapeError::Extraction(format!(
                        "article page {page_url} yielded no fields"
                    )));
                }
                Ok(ItemDetail {
                    name: page_title(html),
                    url: page_url.clone(),
                    fields,
                    categories,
                    // Shop articles are single items; no checklist field.
                    checklist: None,
                })
            })
            .await?;

        if let Ok(json) = serde_json::to_string(&detail) {
            self.cache.set(&cache_key, json, None);
        }
        Ok(detail)
    }
}

fn search_url(query: &str) -> Result<Url, ScrapeError> {
    let mut url = Url::parse(BASE_URL)
        .and_then(|base| base.join("recherche"))
        .map_err(|e| ScrapeError::Extraction(format!("bad search url: {e}")))?;
    url.query_pairs_mut().append_pair("motcle", query);
    Ok(url)
}
