//! NPI inventory domain module.
//!
//! This crate contains business rules for non-product inventory, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage). The review
//! workflow talks to its backend through the [`review::ReviewClient`] seam.

pub mod dashboard;
pub mod filter;
pub mod item;
pub mod live;
pub mod movement;
pub mod review;
pub mod status;

pub use dashboard::{ActionItem, DashboardStats, InventoryStats, dashboard_stats, inventory_stats};
pub use filter::{InventoryFilters, SortDirection, SortField, filter_items, sort_items};
pub use item::{
    AdjustStock, Category, InventoryItem, ItemDetails, Location, NewItem, Restock, SubCategory,
    check_sub_category,
};
pub use live::{RowChange, apply_change};
pub use movement::{MovementType, StockMovement};
pub use review::{
    QueueProgress, ReviewAction, ReviewClient, ReviewDraft, ReviewError, ReviewItem, ReviewQueue,
    ReviewRequest, ReviewSession, ReviewUpdates, sort_review_queue,
};
pub use status::{StockStatus, classify, stock_ratio};
