//! Service wiring: the inventory store the handlers share and its change feed.

use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

use npi_infra::{
    AppConfig, BroadcastChangeFeed, ChangeFeed, InMemoryInventoryStore, InventoryStore,
    NotifyingStore, PostgresInventoryStore, StoreResult, db,
};
use npi_inventory::RowChange;

#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn InventoryStore>,
    feed: BroadcastChangeFeed,
}

impl AppServices {
    /// Wrap `store` so every accepted write is published on the change feed.
    pub fn new<S: InventoryStore + 'static>(store: S) -> Self {
        let feed = BroadcastChangeFeed::default();
        let store = NotifyingStore::new(store, feed.clone());
        Self {
            store: Arc::new(store),
            feed,
        }
    }

    /// Seeded in-memory store (local development and tests).
    pub fn in_memory() -> Self {
        Self::new(InMemoryInventoryStore::seeded())
    }

    pub async fn from_config(config: &AppConfig) -> StoreResult<Self> {
        match &config.database {
            Some(database) => {
                let pool = db::connect(database).await?;
                Ok(Self::new(PostgresInventoryStore::new(pool)))
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory store");
                Ok(Self::in_memory())
            }
        }
    }

    pub fn store(&self) -> &dyn InventoryStore {
        self.store.as_ref()
    }

    pub fn feed(&self) -> &BroadcastChangeFeed {
        &self.feed
    }
}

/// Item changes as server-sent events, named `insert`, `update` or `delete`.
///
/// Subscribers that fall behind skip the lagged changes.
pub fn item_sse_stream(
    services: Arc<AppServices>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.feed().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(change) => {
            let event = match &change {
                RowChange::Insert(_) => "insert",
                RowChange::Update(_) => "update",
                RowChange::Delete(_) => "delete",
            };
            let data = serde_json::to_string(&change).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(event).data(data)))
        }
        Err(lagged) => {
            tracing::debug!(error = %lagged, "sse subscriber lagged");
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
