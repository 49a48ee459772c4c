//! Label/value extraction for detail pages.
//!
//! Detail pages across the supported sites express attribute tables in
//! several markup shapes (table rows, definition lists, labeled spans),
//! often mixing them on one page. Extraction runs the union of the
//! provider's declared shapes and folds the labels through a synonym
//! table so "Marque" and "Brand" land in the same canonical field.

use std::collections::BTreeMap;

use scraper::Html;

use super::cleanup::{clean_text, normalize_label};
use crate::utils::parse_selector_with_fallback;

/// One structural shape of label/value markup.
///
/// `label` and `value` are scoped to each element matched by `row`.
#[derive(Debug, Clone, Copy)]
pub struct PairShape {
    /// Selector matching one label/value row.
    pub row: &'static str,
    /// Selector for the label element within the row.
    pub label: &'static str,
    /// Selector for the value element within the row.
    pub value: &'static str,
}

/// Declarative extraction rules for one provider's detail pages.
#[derive(Debug, Clone, Copy)]
pub struct DetailRules {
    /// Markup shapes to scan, in order.
    pub shapes: &'static [PairShape],
    /// Maps normalized source labels to canonical field names.
    pub synonyms: &'static [(&'static str, &'static str)],
}

impl DetailRules {
    fn canonical_field(&self, normalized_label: &str) -> Option<&'static str> {
        self.synonyms
            .iter()
            .find(|(label, _)| *label == normalized_label)
            .map(|(_, canonical)| *canonical)
    }
}

/// Extracts label/value fields from a detail page.
///
/// Scans every declared shape, normalizes labels (lowercase, trimmed,
/// trailing colon removed) and maps them through the synonym table.
/// Labels without a synonym entry are kept under their normalized form so
/// downstream normalizers can still see them. The first non-empty value
/// per field wins; later shapes never overwrite earlier ones.
///
/// Never errors: malformed rows are skipped, and an empty map is a valid
/// return whose meaning is judged at the call site.
pub fn extract_detail_fields(html: &str, rules: &DetailRules) -> BTreeMap<String, String> {
    let document = Html::parse_document(html);
    let mut fields: BTreeMap<String, String> = BTreeMap::new();

    for shape in rules.shapes {
        let row_selector = parse_selector_with_fallback(shape.row, "detail row");
        let label_selector = parse_selector_with_fallback(shape.label, "detail label");
        let value_selector = parse_selector_with_fallback(shape.value, "detail value");

        for row in document.select(&row_selector) {
            let Some(label_element) = row.select(&label_selector).next() else {
                continue;
            };
            let Some(value_element) = row.select(&value_selector).next() else {
                continue;
            };
            let label = normalize_label(&label_element.text().collect::<String>());
            if label.is_empty() {
                continue;
            }
            let value = clean_text(&value_element.text().collect::<String>());
            if value.is_empty() {
                continue;
            }
            let field = rules
                .canonical_field(&label)
                .map(str::to_string)
                .unwrap_or(label);
            // First non-empty value wins.
            fields.entry(field).or_insert(value);
        }
    }

    log::debug!("extracted {} detail fields", fields.len());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: DetailRules = DetailRules {
        shapes: &[
            PairShape {
                row: "table.specs tr",
                label: "th",
                value: "td",
            },
            PairShape {
                row: "dl.infos div",
                label: "dt",
                value: "dd",
            },
            PairShape {
                row: "div.attribute",
                label: "span.label",
                value: "span.value",
            },
        ],
        synonyms: &[
            ("marque", "brand"),
            ("brand", "brand"),
            ("fabricant", "brand"),
            ("année", "year"),
            ("year", "year"),
            ("référence", "reference"),
        ],
    };

    #[test]
    fn test_table_shape_with_synonym_mapping() {
        let html = r#"
            <table class="specs">
              <tr><th>Marque :</th><td>Takara</td></tr>
              <tr><th>Année</th><td>1984</td></tr>
            </table>"#;
        let fields = extract_detail_fields(html, &RULES);
        assert_eq!(fields.get("brand").unwrap(), "Takara");
        assert_eq!(fields.get("year").unwrap(), "1984");
    }

    #[test]
    fn test_mixed_shapes_on_one_page() {
        let html = r#"
            <dl class="infos"><div><dt>Référence</dt><dd>MB-04</dd></div></dl>
            <div class="attribute">
              <span class="label">Year</span><span class="value">1985</span>
            </div>"#;
        let fields = extract_detail_fields(html, &RULES);
        assert_eq!(fields.get("reference").unwrap(), "MB-04");
        assert_eq!(fields.get("year").unwrap(), "1985");
    }

    #[test]
    fn test_first_non_empty_value_wins() {
        // The same canonical field appears in two shapes; the table comes
        // first in the rule order and must win.
        let html = r#"
            <table class="specs"><tr><th>Brand</th><td>Hasbro</td></tr></table>
            <div class="attribute">
              <span class="label">Marque</span><span class="value">Takara</span>
            </div>"#;
        let fields = extract_detail_fields(html, &RULES);
        assert_eq!(fields.get("brand").unwrap(), "Hasbro");
    }

    #[test]
    fn test_unknown_label_kept_under_normalized_form() {
        let html = r#"
            <table class="specs"><tr><th>Gamme :</th><td>Diaclone</td></tr></table>"#;
        let fields = extract_detail_fields(html, &RULES);
        assert_eq!(fields.get("gamme").unwrap(), "Diaclone");
    }

    #[test]
    fn test_rows_missing_label_or_value_skipped() {
        let html = r#"
            <table class="specs">
              <tr><th>Orphan label</th></tr>
              <tr><td>Orphan value</td></tr>
              <tr><th>Marque</th><td>  </td></tr>
              <tr><th>Year</th><td>1986</td></tr>
            </table>"#;
        let fields = extract_detail_fields(html, &RULES);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("year").unwrap(), "1986");
    }

    #[test]
    fn test_empty_page_yields_empty_map() {
        let fields = extract_detail_fields("<html><body></body></html>", &RULES);
        assert!(fields.is_empty());
    }
}
