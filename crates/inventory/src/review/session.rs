//! Drives a [`ReviewQueue`] against the backend.
//!
//! The local queue only changes after the backend accepts an action; a failed
//! round trip leaves the list, cursor and draft exactly as they were.

use std::future::Future;

use thiserror::Error;

use crate::item::Location;
use crate::review::queue::{QueueProgress, ReviewDraft, ReviewQueue};
use crate::review::types::{ReviewAction, ReviewItem, ReviewRequest};

/// Backend seam for the review workflow.
pub trait ReviewClient {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Active items flagged for review, in queue order.
    fn fetch_queue(&self) -> impl Future<Output = Result<Vec<ReviewItem>, Self::Error>> + Send;

    fn fetch_locations(&self) -> impl Future<Output = Result<Vec<Location>, Self::Error>> + Send;

    fn submit(&self, request: &ReviewRequest) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

#[derive(Debug, Error)]
pub enum ReviewError<E: std::error::Error + 'static> {
    #[error("no item is selected for review")]
    NoCurrentItem,

    #[error("review request failed: {0}")]
    Remote(#[source] E),
}

pub struct ReviewSession<C: ReviewClient> {
    client: C,
    queue: ReviewQueue,
}

impl<C: ReviewClient> ReviewSession<C> {
    pub async fn start(client: C) -> Result<Self, ReviewError<C::Error>> {
        let items = client.fetch_queue().await.map_err(ReviewError::Remote)?;
        let locations = client.fetch_locations().await.map_err(ReviewError::Remote)?;
        Ok(Self {
            client,
            queue: ReviewQueue::new(items, locations),
        })
    }

    pub fn queue(&self) -> &ReviewQueue {
        &self.queue
    }

    pub fn current(&self) -> Option<&ReviewItem> {
        self.queue.current()
    }

    pub fn draft_mut(&mut self) -> Option<&mut ReviewDraft> {
        self.queue.draft_mut()
    }

    pub fn next(&mut self) {
        self.queue.next();
    }

    pub fn previous(&mut self) {
        self.queue.previous();
    }

    pub async fn complete(&mut self) -> Result<QueueProgress, ReviewError<C::Error>> {
        self.resolve(ReviewAction::Complete).await
    }

    pub async fn skip(&mut self) -> Result<QueueProgress, ReviewError<C::Error>> {
        self.resolve(ReviewAction::Skip).await
    }

    pub async fn archive(&mut self) -> Result<QueueProgress, ReviewError<C::Error>> {
        self.resolve(ReviewAction::Archive).await
    }

    async fn resolve(&mut self, action: ReviewAction) -> Result<QueueProgress, ReviewError<C::Error>> {
        let request = self.queue.request(action).ok_or(ReviewError::NoCurrentItem)?;
        self.client.submit(&request).await.map_err(ReviewError::Remote)?;
        Ok(self.queue.resolve_current())
    }

    pub fn into_client(self) -> C {
        self.client
    }
}
