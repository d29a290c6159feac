//! One worksheet's rows into import records.

use std::collections::HashMap;

use serde::Serialize;

use crate::marker::extract_review_marker;
use crate::normalize::{
    Cell, DEFAULT_UOM, gram_conversion, normalize_location, parse_number, parse_text, unit_cost,
};

pub const COL_PRODUCT: &str = "Product";
pub const COL_LOCATION: &str = "Location";
pub const COL_COUNT: &str = "Count";
pub const COL_UOM: &str = "UOM";
pub const COL_PKG_SIZE: &str = "Pkg Size";
pub const COL_PRICE: &str = "Price";
pub const COL_UNIT_COST: &str = "Unit Cost";
pub const COL_DESIRED: &str = "Desired Stock";
pub const COL_LEAD_TIME: &str = "Lead Time";
pub const COL_SOURCE: &str = "Source";
pub const COL_STAFF: &str = "Staff";
pub const COL_NOTES: &str = "Notes";

/// Category name for a sheet; `None` for sheets the import ignores.
pub fn category_for_sheet(sheet: &str) -> Option<&'static str> {
    match sheet {
        "Ingredients" => Some("Ingredients"),
        "Packaging" => Some("Packaging"),
        "Labels" => Some("Labels"),
        "White Label" => Some("White Label"),
        "Other Supplies" => Some("Supplies"),
        _ => None,
    }
}

/// A data row keyed by column header. Missing columns read as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow {
    cells: HashMap<String, Cell>,
}

impl SheetRow {
    /// Zip a header row with a data row; surplus cells without a header are
    /// dropped. A repeated header keeps its first column.
    pub fn new(headers: &[String], cells: impl IntoIterator<Item = Cell>) -> Self {
        let mut by_header = HashMap::new();
        for (header, cell) in headers.iter().zip(cells) {
            if !header.is_empty() {
                by_header.entry(header.clone()).or_insert(cell);
            }
        }
        Self { cells: by_header }
    }

    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Cell)>) -> Self {
        Self {
            cells: pairs.into_iter().map(|(k, c)| (k.into(), c)).collect(),
        }
    }

    pub fn text(&self, column: &str) -> Option<String> {
        self.cells.get(column).and_then(parse_text)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.cells.get(column).and_then(parse_number)
    }
}

/// A normalized item row, before reference keys are resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportRecord {
    pub name: String,
    pub category: String,
    pub sub_category: Option<String>,
    pub location: String,
    pub count: f64,
    pub uom: String,
    pub pkg_size: Option<f64>,
    pub price: Option<f64>,
    pub unit_cost: Option<f64>,
    pub desired_count: Option<f64>,
    pub lead_time: Option<String>,
    pub source: Option<String>,
    pub staff: Option<String>,
    pub gram_conversion: Option<f64>,
    pub notes: Option<String>,
    pub needs_review: bool,
    pub review_source: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSheet {
    pub name: String,
    pub category: String,
    pub records: Vec<ImportRecord>,
}

/// Parse a sheet's data rows (header row excluded).
///
/// Returns `None` when the sheet name maps to no category. Rows without a
/// product name are skipped; a name ending in `:` opens a sub-category that
/// applies to the rows below it until the next such header.
pub fn parse_sheet(sheet: &str, rows: &[SheetRow]) -> Option<ParsedSheet> {
    let category = category_for_sheet(sheet)?;
    let mut sub_category: Option<String> = None;
    let mut records = Vec::new();

    for row in rows {
        let Some(name) = row.text(COL_PRODUCT) else {
            continue;
        };
        if let Some(header) = name.strip_suffix(':') {
            let header = header.trim();
            sub_category = (!header.is_empty()).then(|| header.to_string());
            continue;
        }
        records.push(record(name, category, sub_category.clone(), row));
    }

    Some(ParsedSheet {
        name: sheet.to_string(),
        category: category.to_string(),
        records,
    })
}

fn record(name: String, category: &str, sub_category: Option<String>, row: &SheetRow) -> ImportRecord {
    let uom = row.text(COL_UOM).unwrap_or_else(|| DEFAULT_UOM.to_string());
    let pkg_size = row.number(COL_PKG_SIZE);
    let price = row.number(COL_PRICE);
    let marker = extract_review_marker(row.text(COL_NOTES).as_deref());

    ImportRecord {
        name,
        category: category.to_string(),
        sub_category,
        location: normalize_location(row.text(COL_LOCATION).as_deref()),
        count: row.number(COL_COUNT).unwrap_or(0.0),
        gram_conversion: gram_conversion(&uom, category),
        unit_cost: unit_cost(row.number(COL_UNIT_COST), price, pkg_size),
        uom,
        pkg_size,
        price,
        desired_count: row.number(COL_DESIRED),
        lead_time: row.text(COL_LEAD_TIME),
        source: row.text(COL_SOURCE),
        staff: row.text(COL_STAFF),
        notes: marker.notes,
        needs_review: marker.needs_review,
        review_source: marker.review_source,
    }
}
