//! Inventory persistence boundary.
//!
//! Every count-changing write goes through exactly one store call so the item
//! update and its movement land together (one procedure invocation on Postgres,
//! one write lock in memory).

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use npi_core::{DomainError, ItemId, UserId};
use npi_inventory::{
    AdjustStock, Category, InventoryItem, ItemDetails, Location, NewItem, Restock, ReviewItem,
    ReviewUpdates, StockMovement, SubCategory,
};

pub use in_memory::InMemoryInventoryStore;
pub use postgres::PostgresInventoryStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<DomainError> for StoreError {
    fn from(value: DomainError) -> Self {
        StoreError::Validation(value.to_string())
    }
}

/// Facade over the inventory datastore.
///
/// `actor` is the authenticated user stamped on the write, when known
/// (the importer runs without one).
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn categories(&self) -> StoreResult<Vec<Category>>;

    async fn sub_categories(&self) -> StoreResult<Vec<SubCategory>>;

    async fn locations(&self) -> StoreResult<Vec<Location>>;

    /// Active items, ordered by name.
    async fn list_items(&self) -> StoreResult<Vec<InventoryItem>>;

    async fn get_item(&self, id: ItemId) -> StoreResult<InventoryItem>;

    /// Case-insensitive exact name match among active items.
    async fn find_active_by_name(&self, name: &str) -> StoreResult<Option<InventoryItem>>;

    /// Stores the record as given, after resolving its reference keys.
    /// Form rules (`NewItem::validate`) are the caller's to apply, since
    /// imported rows are taken verbatim.
    async fn insert_item(&self, item: NewItem, actor: Option<UserId>) -> StoreResult<InventoryItem>;

    async fn update_item(
        &self,
        id: ItemId,
        details: ItemDetails,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem>;

    /// Soft delete (`is_active = false`).
    async fn deactivate_item(&self, id: ItemId, actor: Option<UserId>) -> StoreResult<InventoryItem>;

    async fn restock(
        &self,
        id: ItemId,
        restock: Restock,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem>;

    async fn adjust_stock(
        &self,
        id: ItemId,
        adjust: AdjustStock,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem>;

    async fn record_movement(&self, movement: StockMovement) -> StoreResult<()>;

    /// Newest first.
    async fn movements_for_item(&self, id: ItemId) -> StoreResult<Vec<StockMovement>>;

    /// Newest first, across all items.
    async fn recent_movements(&self, limit: usize) -> StoreResult<Vec<StockMovement>>;

    /// Active items flagged for review, in queue order.
    async fn review_queue(&self) -> StoreResult<Vec<ReviewItem>>;

    /// Apply confirmed values, clear the flag and stamp the reviewer.
    async fn complete_review(
        &self,
        id: ItemId,
        updates: ReviewUpdates,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem>;

    /// Clear the flag without edits; `deactivate` also archives the item.
    async fn skip_review(
        &self,
        id: ItemId,
        deactivate: bool,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem>;
}

#[async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn categories(&self) -> StoreResult<Vec<Category>> {
        (**self).categories().await
    }

    async fn sub_categories(&self) -> StoreResult<Vec<SubCategory>> {
        (**self).sub_categories().await
    }

    async fn locations(&self) -> StoreResult<Vec<Location>> {
        (**self).locations().await
    }

    async fn list_items(&self) -> StoreResult<Vec<InventoryItem>> {
        (**self).list_items().await
    }

    async fn get_item(&self, id: ItemId) -> StoreResult<InventoryItem> {
        (**self).get_item(id).await
    }

    async fn find_active_by_name(&self, name: &str) -> StoreResult<Option<InventoryItem>> {
        (**self).find_active_by_name(name).await
    }

    async fn insert_item(&self, item: NewItem, actor: Option<UserId>) -> StoreResult<InventoryItem> {
        (**self).insert_item(item, actor).await
    }

    async fn update_item(
        &self,
        id: ItemId,
        details: ItemDetails,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem> {
        (**self).update_item(id, details, actor).await
    }

    async fn deactivate_item(&self, id: ItemId, actor: Option<UserId>) -> StoreResult<InventoryItem> {
        (**self).deactivate_item(id, actor).await
    }

    async fn restock(
        &self,
        id: ItemId,
        restock: Restock,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem> {
        (**self).restock(id, restock, actor).await
    }

    async fn adjust_stock(
        &self,
        id: ItemId,
        adjust: AdjustStock,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem> {
        (**self).adjust_stock(id, adjust, actor).await
    }

    async fn record_movement(&self, movement: StockMovement) -> StoreResult<()> {
        (**self).record_movement(movement).await
    }

    async fn movements_for_item(&self, id: ItemId) -> StoreResult<Vec<StockMovement>> {
        (**self).movements_for_item(id).await
    }

    async fn recent_movements(&self, limit: usize) -> StoreResult<Vec<StockMovement>> {
        (**self).recent_movements(limit).await
    }

    async fn review_queue(&self) -> StoreResult<Vec<ReviewItem>> {
        (**self).review_queue().await
    }

    async fn complete_review(
        &self,
        id: ItemId,
        updates: ReviewUpdates,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem> {
        (**self).complete_review(id, updates, actor).await
    }

    async fn skip_review(
        &self,
        id: ItemId,
        deactivate: bool,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem> {
        (**self).skip_review(id, deactivate, actor).await
    }
}
