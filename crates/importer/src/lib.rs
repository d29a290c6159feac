//! Workbook import for the NPI inventory.
//!
//! The pipeline is split so the pure part can be tested without files or a
//! datastore:
//! - `workbook`: reads an `.xlsx` into plain [`Cell`] rows (calamine)
//! - `normalize` / `marker`: cell-level cleanup and review-flag extraction
//! - `sheet`: turns one sheet's rows into [`ImportRecord`]s
//! - `loader`: resolves reference keys and writes through an `InventoryStore`

pub mod error;
pub mod loader;
pub mod marker;
pub mod normalize;
pub mod sheet;
pub mod workbook;

pub use error::ImportError;
pub use loader::{ImportCounts, ImportSummary, Loader, SheetSummary, dry_run_summary};
pub use marker::{ReviewMarker, extract_review_marker};
pub use normalize::Cell;
pub use sheet::{ImportRecord, ParsedSheet, SheetRow, category_for_sheet, parse_sheet};
pub use workbook::{RawSheet, parse_workbook, read_workbook};
