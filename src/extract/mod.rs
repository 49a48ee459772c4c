//! Structural HTML extraction.
//!
//! Turns a trusted (challenge-cleared) HTML payload into structured data
//! using declarative per-provider rule tables: repeated record blocks on
//! listing pages, label/value pairs on detail pages, and breadcrumb
//! trails. Extraction is tolerant by contract: a single malformed block is
//! skipped, never fatal, and helpers degrade to empty output rather than
//! erroring. Whole-page emptiness is judged at the call site, which knows
//! whether the page type always carries data when real.

mod breadcrumbs;
pub mod cleanup;
mod detail;
mod records;

pub use breadcrumbs::{extract_breadcrumbs, BreadcrumbRules};
pub use detail::{extract_detail_fields, DetailRules, PairShape};
pub use records::{extract_records, ExtractedRecord, FieldRule, RecordRules};
