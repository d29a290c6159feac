//! Cell-level normalization.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

pub const DEFAULT_LOCATION: &str = "Rear Storage";
pub const DEFAULT_UOM: &str = "ea";
pub const INGREDIENTS: &str = "Ingredients";

/// A workbook cell, independent of the reader that produced it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }
}

static LOCATION_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("Extraction", "Extraction Room"),
        ("Extraction Room", "Extraction Room"),
        ("Gummy", "Gummy Room"),
        ("Gummy Room", "Gummy Room"),
        ("Formulation", "Formulation Room"),
        ("Formulation Room", "Formulation Room"),
        ("Rear Storage", "Rear Storage"),
        ("Office", "Office"),
        ("Restroom Storage", "Restroom Storage"),
    ])
});

/// Grams per one unit, keyed by lowercased UOM.
static GRAM_CONVERSIONS: LazyLock<HashMap<&'static str, f64>> = LazyLock::new(|| {
    HashMap::from([
        ("kg", 1000.0),
        ("kilos", 1000.0),
        ("g", 1.0),
        ("grams", 1.0),
        ("oz", 28.3495),
        ("lb", 453.592),
        ("gal", 3785.41),
        ("l", 1000.0),
        ("ml", 1.0),
    ])
});

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("leading number pattern")
});

/// Parse a numeric cell.
///
/// Text has `$ , < > ?` stripped; a leading number is taken, so `"12 kg"`
/// reads as 12. Empty, `nan` and text without a leading number are absent.
pub fn parse_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Empty | Cell::Bool(_) => None,
        Cell::Number(n) => Some(*n).filter(|n| !n.is_nan()),
        Cell::Text(raw) => {
            let cleaned: String = raw
                .chars()
                .filter(|c| !matches!(c, '$' | ',' | '<' | '>' | '?'))
                .collect();
            let cleaned = cleaned.trim();
            if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("nan") {
                return None;
            }
            LEADING_NUMBER
                .find(cleaned)
                .and_then(|m| m.as_str().parse::<f64>().ok())
        }
    }
}

/// Parse a text cell: trimmed; empty, `nan` and `nat` are absent.
pub fn parse_text(cell: &Cell) -> Option<String> {
    let raw = match cell {
        Cell::Empty => return None,
        Cell::Number(n) => n.to_string(),
        Cell::Text(s) => s.clone(),
        Cell::Bool(b) => b.to_string(),
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") || trimmed.eq_ignore_ascii_case("nat") {
        return None;
    }
    Some(trimmed.to_string())
}

/// Canonical location name; unknown names pass through trimmed.
pub fn normalize_location(raw: Option<&str>) -> String {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return DEFAULT_LOCATION.to_string();
    }
    LOCATION_ALIASES
        .get(trimmed)
        .copied()
        .unwrap_or(trimmed)
        .to_string()
}

/// Explicit unit cost, else `price / pkg_size` (or `price` without a usable
/// package size).
pub fn unit_cost(explicit: Option<f64>, price: Option<f64>, pkg_size: Option<f64>) -> Option<f64> {
    explicit.or_else(|| {
        price.map(|p| match pkg_size {
            Some(size) if size > 0.0 => p / size,
            _ => p,
        })
    })
}

/// Grams per unit, only for ingredients.
pub fn gram_conversion(uom: &str, category: &str) -> Option<f64> {
    if category != INGREDIENTS {
        return None;
    }
    GRAM_CONVERSIONS.get(uom.trim().to_lowercase().as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn numbers_strip_currency_and_comparison_marks() {
        assert_eq!(parse_number(&Cell::text("$1,250.50")), Some(1250.5));
        assert_eq!(parse_number(&Cell::text("<5")), Some(5.0));
        assert_eq!(parse_number(&Cell::text(" 3? ")), Some(3.0));
        assert_eq!(parse_number(&Cell::text("12 kg")), Some(12.0));
        assert_eq!(parse_number(&Cell::Number(7.25)), Some(7.25));
    }

    #[test]
    fn absent_numbers() {
        assert_eq!(parse_number(&Cell::Empty), None);
        assert_eq!(parse_number(&Cell::text("")), None);
        assert_eq!(parse_number(&Cell::text("NaN")), None);
        assert_eq!(parse_number(&Cell::text("about ten")), None);
        assert_eq!(parse_number(&Cell::Number(f64::NAN)), None);
    }

    #[test]
    fn text_normalization() {
        assert_eq!(parse_text(&Cell::text("  MCT Oil ")), Some("MCT Oil".to_string()));
        assert_eq!(parse_text(&Cell::text("nan")), None);
        assert_eq!(parse_text(&Cell::text("NaT")), None);
        assert_eq!(parse_text(&Cell::text("   ")), None);
        assert_eq!(parse_text(&Cell::Number(12.0)), Some("12".to_string()));
    }

    #[test]
    fn locations_are_aliased() {
        assert_eq!(normalize_location(Some("Gummy")), "Gummy Room");
        assert_eq!(normalize_location(Some(" Extraction ")), "Extraction Room");
        assert_eq!(normalize_location(Some("Office")), "Office");
        assert_eq!(normalize_location(Some("Loading Dock")), "Loading Dock");
        assert_eq!(normalize_location(Some("")), "Rear Storage");
        assert_eq!(normalize_location(None), "Rear Storage");
    }

    #[test]
    fn unit_cost_derivation() {
        assert_eq!(unit_cost(Some(2.0), Some(100.0), Some(10.0)), Some(2.0));
        assert_eq!(unit_cost(None, Some(100.0), Some(4.0)), Some(25.0));
        assert_eq!(unit_cost(None, Some(100.0), Some(0.0)), Some(100.0));
        assert_eq!(unit_cost(None, Some(100.0), None), Some(100.0));
        assert_eq!(unit_cost(None, None, Some(4.0)), None);
    }

    #[test]
    fn gram_conversion_only_for_ingredients() {
        assert_eq!(gram_conversion("kg", "Ingredients"), Some(1000.0));
        assert_eq!(gram_conversion(" OZ ", "Ingredients"), Some(28.3495));
        assert_eq!(gram_conversion("L", "Ingredients"), Some(1000.0));
        assert_eq!(gram_conversion("kg", "Packaging"), None);
        assert_eq!(gram_conversion("case", "Ingredients"), None);
    }

    proptest! {
        #[test]
        fn finite_numbers_read_back(n in -1.0e9f64..1.0e9) {
            prop_assert_eq!(parse_number(&Cell::Number(n)), Some(n));
        }

        #[test]
        fn parsed_text_is_trimmed_and_non_empty(s in ".{0,24}") {
            if let Some(t) = parse_text(&Cell::text(s)) {
                prop_assert!(!t.is_empty());
                prop_assert_eq!(t.trim(), t.as_str());
            }
        }
    }
}
