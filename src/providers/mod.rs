//! Per-provider scraping definitions.
//!
//! Each provider contributes a declarative rule table (record blocks,
//! detail-field shapes, breadcrumb container), a challenge strategy for
//! its site's anti-bot mechanics, and the operations route handlers call.
//! All the heavy lifting lives in the shared core; a provider is mostly
//! data.

mod coleka;
mod luluberlu;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::enumeration::Enumeration;
use crate::extract::cleanup::clean_text;

pub use coleka::{ColekaProvider, ColekaStrategy};
pub use luluberlu::{LuluBerluProvider, LuluBerluStrategy};

/// A fully scraped detail page, ready for downstream normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDetail {
    /// Display name from the page heading, when present.
    pub name: Option<String>,
    /// Canonical URL of the detail page.
    pub url: String,
    /// Label/value attributes, keyed by canonical field name.
    pub fields: BTreeMap<String, String>,
    /// Category trail from the breadcrumb.
    pub categories: Vec<String>,
    /// Parsed checklist enumeration, when the page carries one.
    pub checklist: Option<Enumeration>,
}

static H1_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1").expect("h1 selector is valid - this is a programming error")
});

/// Extracts the page heading used as the item display name.
fn page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let heading = document.select(&H1_SELECTOR).next()?;
    let text = clean_text(&heading.text().collect::<String>());
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
