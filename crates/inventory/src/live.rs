//! Merging row-change notifications into a locally held list.
//!
//! The notification transport is owned elsewhere; this only decides how an
//! inbound change lands in local state. No concurrency token is carried, so
//! whichever change arrives last wins.

use serde::{Deserialize, Serialize};

use npi_core::Entity;

/// A row-level change notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "row", rename_all = "lowercase")]
pub enum RowChange<T: Entity> {
    Insert(T),
    Update(T),
    Delete(T::Id),
}

/// Apply one change to `rows`.
///
/// An update for a row we do not hold is appended, and a repeated insert
/// replaces the existing row, so replays are harmless.
pub fn apply_change<T: Entity>(rows: &mut Vec<T>, change: RowChange<T>) {
    match change {
        RowChange::Insert(row) | RowChange::Update(row) => {
            let id = row.id();
            match rows.iter_mut().find(|r| r.id() == id) {
                Some(existing) => *existing = row,
                None => rows.push(row),
            }
        }
        RowChange::Delete(id) => rows.retain(|r| r.id() != id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::tests::item;

    #[test]
    fn insert_update_delete() {
        let mut rows = Vec::new();
        let a = item("a", 1.0, None, 1.0);
        let id = a.id;

        apply_change(&mut rows, RowChange::Insert(a.clone()));
        assert_eq!(rows.len(), 1);

        let mut updated = a.clone();
        updated.count = 9.0;
        apply_change(&mut rows, RowChange::Update(updated));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 9.0);

        apply_change(&mut rows, RowChange::Delete(id));
        assert!(rows.is_empty());
    }

    #[test]
    fn replayed_insert_does_not_duplicate() {
        let a = item("a", 1.0, None, 1.0);
        let mut rows = vec![a.clone()];
        apply_change(&mut rows, RowChange::Insert(a));
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn serializes_with_event_tag() {
        let a = item("a", 1.0, None, 1.0);
        let json = serde_json::to_value(RowChange::Delete::<crate::InventoryItem>(a.id)).unwrap();
        assert_eq!(json["event"], "delete");
        assert_eq!(json["row"], serde_json::json!(a.id));
    }
}
