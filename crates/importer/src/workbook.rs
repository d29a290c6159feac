//! `.xlsx` reading via calamine.

use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use tracing::debug;

use crate::error::ImportError;
use crate::normalize::Cell;
use crate::sheet::{ParsedSheet, SheetRow, parse_sheet};

/// A worksheet as read from disk: header row plus data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    pub fn sheet_rows(&self) -> Vec<SheetRow> {
        self.rows
            .iter()
            .map(|cells| SheetRow::new(&self.headers, cells.iter().cloned()))
            .collect()
    }
}

/// Read every worksheet in workbook order.
pub fn read_workbook(path: &Path) -> Result<Vec<RawSheet>, ImportError> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.to_path_buf()));
    }

    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|e: calamine::XlsxError| ImportError::Workbook(e.to_string()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ImportError::Workbook(format!("sheet '{name}': {e}")))?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|header| header.iter().map(|c| c.to_string().trim().to_string()).collect())
            .unwrap_or_default();
        let rows: Vec<Vec<Cell>> = rows.map(|row| row.iter().map(cell).collect()).collect();

        sheets.push(RawSheet { name, headers, rows });
    }
    Ok(sheets)
}

/// Parse the recognized sheets, in workbook order.
pub fn parse_workbook(sheets: &[RawSheet]) -> Vec<ParsedSheet> {
    sheets
        .iter()
        .filter_map(|sheet| {
            let parsed = parse_sheet(&sheet.name, &sheet.sheet_rows());
            if parsed.is_none() {
                debug!(sheet = %sheet.name, "skipping unrecognized sheet");
            }
            parsed
        })
        .collect()
}

fn cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}
