//! Item change notifications.
//!
//! [`NotifyingStore`] publishes a change only after the wrapped store accepted
//! the write. Delivery is lossy: a slow subscriber misses changes rather than
//! holding writers back.

use async_trait::async_trait;
use tokio::sync::broadcast;

use npi_core::{ItemId, UserId};
use npi_inventory::{
    AdjustStock, Category, InventoryItem, ItemDetails, Location, NewItem, Restock, ReviewItem,
    ReviewUpdates, RowChange, StockMovement, SubCategory,
};

use crate::store::{InventoryStore, StoreResult};

pub type ItemChange = RowChange<InventoryItem>;

const DEFAULT_CAPACITY: usize = 1024;

/// Fan-out of item changes to live subscribers.
pub trait ChangeFeed: Send + Sync {
    fn publish(&self, change: ItemChange);

    fn subscribe(&self) -> broadcast::Receiver<ItemChange>;
}

/// In-process feed over a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastChangeFeed {
    tx: broadcast::Sender<ItemChange>,
}

impl BroadcastChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }
}

impl Default for BroadcastChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChangeFeed for BroadcastChangeFeed {
    fn publish(&self, change: ItemChange) {
        // No subscribers is not an error.
        let _ = self.tx.send(change);
    }

    fn subscribe(&self) -> broadcast::Receiver<ItemChange> {
        self.tx.subscribe()
    }
}

/// Store adapter that publishes item changes after successful writes.
pub struct NotifyingStore<S, F> {
    store: S,
    feed: F,
}

impl<S, F> NotifyingStore<S, F> {
    pub fn new(store: S, feed: F) -> Self {
        Self { store, feed }
    }
}

impl<S, F: ChangeFeed> NotifyingStore<S, F> {
    /// Inactive rows leave every live list, so they go out as deletes.
    fn changed(&self, item: &InventoryItem) {
        let change = if item.is_active {
            RowChange::Update(item.clone())
        } else {
            RowChange::Delete(item.id)
        };
        self.feed.publish(change);
    }
}

#[async_trait]
impl<S, F> InventoryStore for NotifyingStore<S, F>
where
    S: InventoryStore,
    F: ChangeFeed,
{
    async fn categories(&self) -> StoreResult<Vec<Category>> {
        self.store.categories().await
    }

    async fn sub_categories(&self) -> StoreResult<Vec<SubCategory>> {
        self.store.sub_categories().await
    }

    async fn locations(&self) -> StoreResult<Vec<Location>> {
        self.store.locations().await
    }

    async fn list_items(&self) -> StoreResult<Vec<InventoryItem>> {
        self.store.list_items().await
    }

    async fn get_item(&self, id: ItemId) -> StoreResult<InventoryItem> {
        self.store.get_item(id).await
    }

    async fn find_active_by_name(&self, name: &str) -> StoreResult<Option<InventoryItem>> {
        self.store.find_active_by_name(name).await
    }

    async fn insert_item(&self, item: NewItem, actor: Option<UserId>) -> StoreResult<InventoryItem> {
        let inserted = self.store.insert_item(item, actor).await?;
        self.feed.publish(RowChange::Insert(inserted.clone()));
        Ok(inserted)
    }

    async fn update_item(
        &self,
        id: ItemId,
        details: ItemDetails,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem> {
        let item = self.store.update_item(id, details, actor).await?;
        self.changed(&item);
        Ok(item)
    }

    async fn deactivate_item(&self, id: ItemId, actor: Option<UserId>) -> StoreResult<InventoryItem> {
        let item = self.store.deactivate_item(id, actor).await?;
        self.changed(&item);
        Ok(item)
    }

    async fn restock(
        &self,
        id: ItemId,
        restock: Restock,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem> {
        let item = self.store.restock(id, restock, actor).await?;
        self.changed(&item);
        Ok(item)
    }

    async fn adjust_stock(
        &self,
        id: ItemId,
        adjust: AdjustStock,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem> {
        let item = self.store.adjust_stock(id, adjust, actor).await?;
        self.changed(&item);
        Ok(item)
    }

    async fn record_movement(&self, movement: StockMovement) -> StoreResult<()> {
        self.store.record_movement(movement).await
    }

    async fn movements_for_item(&self, id: ItemId) -> StoreResult<Vec<StockMovement>> {
        self.store.movements_for_item(id).await
    }

    async fn recent_movements(&self, limit: usize) -> StoreResult<Vec<StockMovement>> {
        self.store.recent_movements(limit).await
    }

    async fn review_queue(&self) -> StoreResult<Vec<ReviewItem>> {
        self.store.review_queue().await
    }

    async fn complete_review(
        &self,
        id: ItemId,
        updates: ReviewUpdates,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem> {
        let item = self.store.complete_review(id, updates, actor).await?;
        self.changed(&item);
        Ok(item)
    }

    async fn skip_review(
        &self,
        id: ItemId,
        deactivate: bool,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem> {
        let item = self.store.skip_review(id, deactivate, actor).await?;
        self.changed(&item);
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryInventoryStore, StoreError};
    use npi_inventory::apply_change;

    async fn new_item(store: &impl InventoryStore, name: &str) -> StoreResult<InventoryItem> {
        let category = store.categories().await?[0].id;
        let location = store.locations().await?[0].id;
        let details = ItemDetails {
            name: name.to_string(),
            category_id: category,
            sub_category_id: None,
            location_id: location,
            uom: "ea".to_string(),
            desired_count: None,
            reorder_point: None,
            unit_cost: 1.0,
            gram_conversion: None,
        };
        store.insert_item(NewItem::new(details, 2.0), None).await
    }

    #[tokio::test]
    async fn subscriber_list_tracks_writes() {
        let feed = BroadcastChangeFeed::default();
        let mut rx = feed.subscribe();
        let store = NotifyingStore::new(InMemoryInventoryStore::seeded(), feed);

        let item = new_item(&store, "Jar Lids").await.unwrap();
        store
            .restock(item.id, Restock { quantity: 3.0, notes: None }, None)
            .await
            .unwrap();

        let mut local = Vec::new();
        apply_change(&mut local, rx.recv().await.unwrap());
        apply_change(&mut local, rx.recv().await.unwrap());
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].count, 5.0);

        store.deactivate_item(item.id, None).await.unwrap();
        apply_change(&mut local, rx.recv().await.unwrap());
        assert!(local.is_empty());
    }

    #[tokio::test]
    async fn failed_write_publishes_nothing() {
        let feed = BroadcastChangeFeed::default();
        let mut rx = feed.subscribe();
        let store = NotifyingStore::new(InMemoryInventoryStore::seeded(), feed);

        let err = store
            .restock(ItemId::new(), Restock { quantity: 1.0, notes: None }, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
