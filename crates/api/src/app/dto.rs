use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use npi_core::{CategoryId, ItemId, LocationId};
use npi_inventory::{
    DashboardStats, InventoryFilters, InventoryItem, ReviewUpdates, SortDirection, SortField,
    StockMovement, StockStatus,
};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// `GET /inventory/items` query string.
#[derive(Debug, Default, Deserialize)]
pub struct ListItemsQuery {
    pub search: Option<String>,
    pub category: Option<CategoryId>,
    pub location: Option<LocationId>,
    pub status: Option<StockStatus>,
    pub sort: Option<SortField>,
    pub dir: Option<SortDirection>,
}

impl ListItemsQuery {
    pub fn filters(&self) -> InventoryFilters {
        InventoryFilters {
            search: self.search.clone(),
            category_id: self.category,
            location_id: self.location,
            status: self.status,
        }
    }
}

/// `PATCH /review` body. Fields are optional so missing ones can be
/// reported with a specific message instead of a generic decode error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPatchRequest {
    pub item_id: Option<String>,
    pub action: Option<String>,
    #[serde(default)]
    pub updates: Option<ReviewUpdates>,
}

// -------------------------
// Response DTOs
// -------------------------

/// An item with its derived stock figures.
#[derive(Debug, Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub status: StockStatus,
    pub stock_ratio: Option<f64>,
    pub stock_value: f64,
}

impl From<InventoryItem> for ItemView {
    fn from(item: InventoryItem) -> Self {
        Self {
            status: item.status(),
            stock_ratio: item.stock_ratio(),
            stock_value: item.stock_value(),
            item,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    #[serde(flatten)]
    pub stats: DashboardStats,
    pub pending_review: usize,
    pub recent_movements: Vec<StockMovement>,
}

// -------------------------
// Parsing helpers
// -------------------------

pub fn parse_item_id(raw: &str) -> Result<ItemId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id"))
}
