//! Inventory list filtering and sorting.

use serde::{Deserialize, Serialize};

use npi_core::{CategoryId, LocationId};

use crate::item::InventoryItem;
use crate::status::StockStatus;

/// List filters; every set filter must match (AND semantics).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryFilters {
    /// Case-insensitive substring of the item name.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, rename = "category")]
    pub category_id: Option<CategoryId>,
    #[serde(default, rename = "location")]
    pub location_id: Option<LocationId>,
    #[serde(default)]
    pub status: Option<StockStatus>,
}

impl InventoryFilters {
    pub fn matches(&self, item: &InventoryItem) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            if !item.name.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        if self.category_id.is_some() && item.category_id != self.category_id {
            return false;
        }
        if self.location_id.is_some() && item.location_id != self.location_id {
            return false;
        }
        if let Some(status) = self.status {
            if item.status() != status {
                return false;
            }
        }
        true
    }
}

pub fn filter_items(items: &[InventoryItem], filters: &InventoryFilters) -> Vec<InventoryItem> {
    items.iter().filter(|i| filters.matches(i)).cloned().collect()
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Name,
    Count,
    DesiredCount,
    UnitCost,
    StockValue,
    /// Most severe first when ascending.
    Status,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

fn severity(status: StockStatus) -> u8 {
    match status {
        StockStatus::Critical => 0,
        StockStatus::Warning => 1,
        StockStatus::Healthy => 2,
    }
}

pub fn sort_items(items: &mut [InventoryItem], field: SortField, direction: SortDirection) {
    items.sort_by(|a, b| {
        let ord = match field {
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Count => a.count.total_cmp(&b.count),
            SortField::DesiredCount => a
                .desired_count
                .unwrap_or(0.0)
                .total_cmp(&b.desired_count.unwrap_or(0.0)),
            SortField::UnitCost => a.unit_cost.total_cmp(&b.unit_cost),
            SortField::StockValue => a.stock_value().total_cmp(&b.stock_value()),
            SortField::Status => severity(a.status()).cmp(&severity(b.status())),
        };
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}
