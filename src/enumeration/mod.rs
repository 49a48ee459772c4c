//! Free-text enumeration parsing.
//!
//! Checklist fields on the supported sites encode member lists compactly:
//! numeric ranges ("1 à 100, 105, 110-120"), letter sequences ("A, B, C"),
//! alphanumeric codes ("A1, B2") and letter ranges ("A à Z"). These must
//! be expanded into full ordered member lists.
//!
//! All parsers here are pure, total functions: no input errors, malformed
//! tokens are silently dropped, and no deduplication is performed at this
//! layer (record extraction dedups; enumerations report the source text
//! as-is).

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::MAX_RANGE_SPAN;

static NUMERIC_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s*(?:à|-|–|—)\s*(\d+)$")
        .expect("numeric range regex is valid - this is a programming error")
});

static ALPHA_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z])\s*(?:à|-|–|—)\s*([A-Za-z])$")
        .expect("alpha range regex is valid - this is a programming error")
});

static BARE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+$").expect("bare number regex is valid - this is a programming error")
});

/// Letters optionally followed by digits: "A", "XII", "A1", "B12".
static ALPHA_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]{1,4}\d{0,3}$")
        .expect("alpha token regex is valid - this is a programming error")
});

/// One member of a parsed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumItem {
    /// Numeric member.
    Number(i64),
    /// Textual member (letter or alphanumeric code), uppercased.
    Text(String),
}

/// A parsed free-text enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumeration {
    /// Source text as it appeared on the page.
    pub raw: String,
    /// Fully expanded members, in source order.
    pub items: Vec<EnumItem>,
    /// Member count; always equals `items.len()`.
    pub total: usize,
}

impl Enumeration {
    /// Parses a field whose content type cannot be predetermined.
    pub fn parse_mixed(raw: &str) -> Self {
        let items = parse_mixed_enumeration(raw);
        let total = items.len();
        Enumeration {
            raw: raw.to_string(),
            items,
            total,
        }
    }
}

fn split_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Expands an inclusive numeric range, ascending only.
///
/// `end < start` is ambiguous input and yields `None` rather than a
/// reversed guess; spans larger than `MAX_RANGE_SPAN` are dropped too.
fn expand_numeric_range(start: i64, end: i64) -> Option<Vec<i64>> {
    if end < start || end - start > MAX_RANGE_SPAN {
        return None;
    }
    Some((start..=end).collect())
}

/// Parses a numeric enumeration like `"1 à 100, 105, 110-120"`.
///
/// Splits on `,`/`;`; range tokens expand inclusively ascending, bare
/// integers pass through, anything else is dropped. Never errors, and
/// never deduplicates: `"1, 2, 2, 3"` yields `[1, 2, 2, 3]`.
pub fn parse_numeric_enumeration(raw: &str) -> Vec<i64> {
    let mut items = Vec::new();
    for token in split_tokens(raw) {
        if let Some(captures) = NUMERIC_RANGE_RE.captures(token) {
            let Ok(start) = captures[1].parse::<i64>() else {
                continue;
            };
            let Ok(end) = captures[2].parse::<i64>() else {
                continue;
            };
            if let Some(expanded) = expand_numeric_range(start, end) {
                items.extend(expanded);
            }
        } else if BARE_NUMBER_RE.is_match(token) {
            if let Ok(value) = token.parse::<i64>() {
                items.push(value);
            }
        }
        // Non-numeric tokens are dropped silently.
    }
    items
}

/// Parses a letter/alphanumeric enumeration like `"A, B, C"`, `"A1, B2"`
/// or `"A à D"`.
///
/// Letter ranges expand by character code inclusive; all output is
/// uppercased. Malformed tokens are dropped, never an error.
pub fn parse_alpha_enumeration(raw: &str) -> Vec<String> {
    let mut items = Vec::new();
    for token in split_tokens(raw) {
        if let Some(expanded) = expand_alpha_range(token) {
            items.extend(expanded);
        } else if ALPHA_TOKEN_RE.is_match(token) {
            items.push(token.to_uppercase());
        }
    }
    items
}

fn expand_alpha_range(token: &str) -> Option<Vec<String>> {
    let captures = ALPHA_RANGE_RE.captures(token)?;
    let start = captures[1].chars().next()?.to_ascii_uppercase();
    let end = captures[2].chars().next()?.to_ascii_uppercase();
    if (end as u32) < (start as u32) {
        return None;
    }
    Some((start..=end).map(String::from).collect())
}

/// Parses a field whose content type (numeric vs alphanumeric) cannot be
/// predetermined.
///
/// Per token, the first matching rule wins: numeric range, then alpha
/// range, then bare number, then alpha token. Token order is never
/// mutated.
pub fn parse_mixed_enumeration(raw: &str) -> Vec<EnumItem> {
    let mut items = Vec::new();
    for token in split_tokens(raw) {
        if let Some(captures) = NUMERIC_RANGE_RE.captures(token) {
            let (Ok(start), Ok(end)) = (captures[1].parse::<i64>(), captures[2].parse::<i64>())
            else {
                continue;
            };
            if let Some(expanded) = expand_numeric_range(start, end) {
                items.extend(expanded.into_iter().map(EnumItem::Number));
            }
        } else if let Some(expanded) = expand_alpha_range(token) {
            items.extend(expanded.into_iter().map(EnumItem::Text));
        } else if BARE_NUMBER_RE.is_match(token) {
            if let Ok(value) = token.parse::<i64>() {
                items.push(EnumItem::Number(value));
            }
        } else if ALPHA_TOKEN_RE.is_match(token) {
            items.push(EnumItem::Text(token.to_uppercase()));
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_range_french_connector() {
        assert_eq!(parse_numeric_enumeration("1 à 5"), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_numeric_range_dash_connector() {
        assert_eq!(parse_numeric_enumeration("3-6"), vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_numeric_mixed_ranges_and_singles() {
        assert_eq!(
            parse_numeric_enumeration("1 à 3, 7; 10-12"),
            vec![1, 2, 3, 7, 10, 11, 12]
        );
    }

    #[test]
    fn test_numeric_descending_range_emits_nothing() {
        // Ambiguous input is dropped, not reversed.
        assert_eq!(parse_numeric_enumeration("9 à 5"), Vec::<i64>::new());
        assert_eq!(parse_numeric_enumeration("9-5, 2"), vec![2]);
    }

    #[test]
    fn test_numeric_single_member_range() {
        assert_eq!(parse_numeric_enumeration("4 à 4"), vec![4]);
    }

    #[test]
    fn test_numeric_no_dedup_at_this_layer() {
        // Dedup is a record-extraction contract, not an enumeration one.
        assert_eq!(parse_numeric_enumeration("1, 2, 2, 3"), vec![1, 2, 2, 3]);
    }

    #[test]
    fn test_numeric_malformed_tokens_skipped() {
        assert_eq!(
            parse_numeric_enumeration("1, deux, 3, 4x, , 5"),
            vec![1, 3, 5]
        );
    }

    #[test]
    fn test_numeric_pathological_span_dropped() {
        assert_eq!(parse_numeric_enumeration("1 à 999999999"), Vec::<i64>::new());
    }

    #[test]
    fn test_numeric_overflowing_token_dropped() {
        assert_eq!(
            parse_numeric_enumeration("99999999999999999999, 7"),
            vec![7]
        );
    }

    #[test]
    fn test_alpha_range_expansion() {
        assert_eq!(parse_alpha_enumeration("A à D"), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_alpha_case_normalized() {
        assert_eq!(parse_alpha_enumeration("a, b, c"), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_alphanumeric_codes() {
        assert_eq!(parse_alpha_enumeration("A1, B12"), vec!["A1", "B12"]);
    }

    #[test]
    fn test_roman_numeral_like_tokens() {
        assert_eq!(parse_alpha_enumeration("I, II, III"), vec!["I", "II", "III"]);
    }

    #[test]
    fn test_alpha_descending_range_emits_nothing() {
        assert_eq!(parse_alpha_enumeration("D à A"), Vec::<String>::new());
    }

    #[test]
    fn test_mixed_first_rule_wins_per_token() {
        assert_eq!(
            parse_mixed_enumeration("1-3, A à B, 7, C1"),
            vec![
                EnumItem::Number(1),
                EnumItem::Number(2),
                EnumItem::Number(3),
                EnumItem::Text("A".to_string()),
                EnumItem::Text("B".to_string()),
                EnumItem::Number(7),
                EnumItem::Text("C1".to_string()),
            ]
        );
    }

    #[test]
    fn test_mixed_preserves_token_order() {
        let items = parse_mixed_enumeration("Z, 1, Y, 2");
        assert_eq!(
            items,
            vec![
                EnumItem::Text("Z".to_string()),
                EnumItem::Number(1),
                EnumItem::Text("Y".to_string()),
                EnumItem::Number(2),
            ]
        );
    }

    #[test]
    fn test_enumeration_total_agrees_with_items() {
        let enumeration = Enumeration::parse_mixed("1 à 3, A, garbage!!, 9");
        assert_eq!(enumeration.total, enumeration.items.len());
        assert_eq!(enumeration.total, 5);
        assert_eq!(enumeration.raw, "1 à 3, A, garbage!!, 9");
    }

    #[test]
    fn test_empty_and_garbage_input_never_error() {
        assert!(parse_numeric_enumeration("").is_empty());
        assert!(parse_alpha_enumeration(";;;,,,").is_empty());
        assert!(parse_mixed_enumeration("???").is_empty());
    }
}
