use std::path::PathBuf;

use thiserror::Error;

use npi_infra::StoreError;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("workbook not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to read workbook: {0}")]
    Workbook(String),

    /// Categories, sub-categories or locations could not be loaded.
    #[error("failed to load lookup tables: {0}")]
    Lookup(#[source] StoreError),
}
