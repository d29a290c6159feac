//! Three-tier stock status.

use serde::{Deserialize, Serialize};

/// At or below this share of the desired count an item is critical.
pub const CRITICAL_RATIO: f64 = 0.2;
/// At or below this share of the desired count an item is low.
pub const WARNING_RATIO: f64 = 0.5;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Healthy,
    Warning,
    Critical,
}

impl core::str::FromStr for StockStatus {
    type Err = npi_core::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "healthy" => Ok(StockStatus::Healthy),
            "warning" => Ok(StockStatus::Warning),
            "critical" => Ok(StockStatus::Critical),
            other => Err(npi_core::DomainError::unknown("stock status", other)),
        }
    }
}

/// `count / desired`, or `None` when there is no (non-zero) target.
pub fn stock_ratio(count: f64, desired_count: Option<f64>) -> Option<f64> {
    match desired_count {
        Some(desired) if desired != 0.0 => Some(count / desired),
        _ => None,
    }
}

/// Classify an item's stock level against its desired count.
///
/// No target means nothing to be low against, so the item is healthy.
pub fn classify(count: f64, desired_count: Option<f64>) -> StockStatus {
    match stock_ratio(count, desired_count) {
        None => StockStatus::Healthy,
        Some(ratio) if ratio <= CRITICAL_RATIO => StockStatus::Critical,
        Some(ratio) if ratio <= WARNING_RATIO => StockStatus::Warning,
        Some(_) => StockStatus::Healthy,
    }
}
