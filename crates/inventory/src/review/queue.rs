//! The review queue as a pure state machine.
//!
//! Resolving an item (complete, skip or archive) removes it from the local
//! list. The cursor then stays put so it lands on the item that slid into the
//! vacated slot; resolving the last entry moves it back by one.

use serde::{Deserialize, Serialize};

use npi_core::LocationId;

use crate::item::Location;
use crate::review::types::{ReviewAction, ReviewItem, ReviewRequest, ReviewUpdates};

const DEFAULT_UOM: &str = "ea";

/// Editable copy of the current item's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewDraft {
    pub count: f64,
    pub unit_cost: Option<f64>,
    pub uom: String,
    pub desired_count: Option<f64>,
    pub location_id: Option<LocationId>,
    pub source: Option<String>,
}

impl ReviewDraft {
    /// Seed from the queue row; the location is resolved by name.
    pub fn seed(item: &ReviewItem, locations: &[Location]) -> Self {
        let location_id = item
            .location_name
            .as_deref()
            .and_then(|name| locations.iter().find(|l| l.name == name))
            .map(|l| l.id);
        let uom = if item.uom.trim().is_empty() {
            DEFAULT_UOM.to_string()
        } else {
            item.uom.clone()
        };
        Self {
            count: item.count,
            unit_cost: item.unit_cost,
            uom,
            desired_count: item.desired_count,
            location_id,
            source: item.source.clone(),
        }
    }

    pub fn into_updates(self) -> ReviewUpdates {
        ReviewUpdates {
            count: Some(self.count),
            unit_cost: self.unit_cost,
            uom: Some(self.uom),
            desired_count: self.desired_count,
            location_id: self.location_id,
            source: self.source,
        }
    }
}

/// Where the walk stands after an item is resolved.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum QueueProgress {
    Continue { position: usize, remaining: usize },
    Finished,
}

#[derive(Debug, Clone)]
pub struct ReviewQueue {
    items: Vec<ReviewItem>,
    position: usize,
    draft: Option<ReviewDraft>,
    locations: Vec<Location>,
}

impl ReviewQueue {
    pub fn new(items: Vec<ReviewItem>, locations: Vec<Location>) -> Self {
        let mut queue = Self {
            items,
            position: 0,
            draft: None,
            locations,
        };
        queue.reseed();
        queue
    }

    pub fn items(&self) -> &[ReviewItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current(&self) -> Option<&ReviewItem> {
        self.items.get(self.position)
    }

    pub fn draft(&self) -> Option<&ReviewDraft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut ReviewDraft> {
        self.draft.as_mut()
    }

    /// Move forward; stops at the last item. Unsaved draft edits are dropped.
    pub fn next(&mut self) {
        if self.position + 1 < self.items.len() {
            self.position += 1;
            self.reseed();
        }
    }

    /// Move back; stops at the first item.
    pub fn previous(&mut self) {
        if self.position > 0 {
            self.position -= 1;
            self.reseed();
        }
    }

    /// Build the request that resolves the current item.
    ///
    /// Only `complete` carries the draft.
    pub fn request(&self, action: ReviewAction) -> Option<ReviewRequest> {
        let item = self.current()?;
        let updates = match action {
            ReviewAction::Complete => self.draft.clone().map(ReviewDraft::into_updates),
            ReviewAction::Skip | ReviewAction::Archive => None,
        };
        Some(ReviewRequest {
            item_id: item.id,
            action,
            updates,
        })
    }

    /// Drop the current item after the backend accepted its resolution.
    pub fn resolve_current(&mut self) -> QueueProgress {
        if self.position < self.items.len() {
            self.items.remove(self.position);
        }
        if self.items.is_empty() {
            self.position = 0;
            self.draft = None;
            return QueueProgress::Finished;
        }
        if self.position >= self.items.len() {
            self.position = self.items.len() - 1;
        }
        self.reseed();
        QueueProgress::Continue {
            position: self.position,
            remaining: self.items.len(),
        }
    }

    fn reseed(&mut self) {
        self.draft = self
            .items
            .get(self.position)
            .map(|item| ReviewDraft::seed(item, &self.locations));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use npi_core::ItemId;

    pub(crate) fn review_item(name: &str) -> ReviewItem {
        ReviewItem {
            id: ItemId::new(),
            name: name.to_string(),
            category_name: "Ingredients".to_string(),
            sub_category_name: None,
            location_name: Some("Rear Storage".to_string()),
            count: 4.0,
            uom: "kg".to_string(),
            unit_cost: Some(2.0),
            desired_count: None,
            source: None,
            review_source: Some("count".to_string()),
            notes: None,
        }
    }

    fn names(queue: &ReviewQueue) -> Vec<&str> {
        queue.items().iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn draft_resolves_location_by_name() {
        let rear = Location {
            id: LocationId::new(),
            name: "Rear Storage".to_string(),
            description: None,
        };
        let queue = ReviewQueue::new(vec![review_item("a")], vec![rear.clone()]);
        assert_eq!(queue.draft().unwrap().location_id, Some(rear.id));
    }

    #[test]
    fn blank_uom_defaults_to_each() {
        let mut item = review_item("a");
        item.uom = String::new();
        assert_eq!(ReviewDraft::seed(&item, &[]).uom, "ea");
    }

    #[test]
    fn navigation_is_clamped() {
        let mut queue = ReviewQueue::new(vec![review_item("a"), review_item("b")], vec![]);
        queue.previous();
        assert_eq!(queue.position(), 0);
        queue.next();
        queue.next();
        assert_eq!(queue.position(), 1);
    }

    #[test]
    fn resolving_middle_item_keeps_position() {
        let mut queue = ReviewQueue::new(
            vec![review_item("a"), review_item("b"), review_item("c")],
            vec![],
        );
        queue.next();
        let progress = queue.resolve_current();
        assert_eq!(progress, QueueProgress::Continue { position: 1, remaining: 2 });
        assert_eq!(names(&queue), ["a", "c"]);
        assert_eq!(queue.current().unwrap().name, "c");
    }

    #[test]
    fn resolving_last_item_steps_back() {
        let mut queue = ReviewQueue::new(vec![review_item("a"), review_item("b")], vec![]);
        queue.next();
        let progress = queue.resolve_current();
        assert_eq!(progress, QueueProgress::Continue { position: 0, remaining: 1 });
        assert_eq!(queue.current().unwrap().name, "a");
    }

    #[test]
    fn resolving_only_item_finishes() {
        let mut queue = ReviewQueue::new(vec![review_item("a")], vec![]);
        assert_eq!(queue.resolve_current(), QueueProgress::Finished);
        assert!(queue.current().is_none());
        assert!(queue.draft().is_none());
    }

    #[test]
    fn only_complete_carries_updates() {
        let mut queue = ReviewQueue::new(vec![review_item("a")], vec![]);
        queue.draft_mut().unwrap().count = 9.0;
        let complete = queue.request(ReviewAction::Complete).unwrap();
        assert_eq!(complete.updates.unwrap().count, Some(9.0));
        assert!(queue.request(ReviewAction::Skip).unwrap().updates.is_none());
        assert!(queue.request(ReviewAction::Archive).unwrap().updates.is_none());
    }
}
