//! Dashboard rollups derived from the active item set.

use serde::{Deserialize, Serialize};

use npi_core::ItemId;

use crate::item::InventoryItem;
use crate::status::StockStatus;

const ACTION_ITEM_LIMIT: usize = 5;

/// Header stats for the inventory list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryStats {
    pub total: usize,
    pub healthy: usize,
    pub warning: usize,
    pub critical: usize,
    pub total_value: f64,
}

/// An item that needs restocking attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: ItemId,
    pub name: String,
    pub count: f64,
    pub desired_count: f64,
    pub location: String,
    pub category: Option<String>,
    pub status: StockStatus,
}

impl ActionItem {
    fn ratio(&self) -> f64 {
        self.count / self.desired_count
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub critical: usize,
    pub warning: usize,
    pub healthy: usize,
    pub stock_value: f64,
    /// Most severe first, at most five.
    pub critical_items: Vec<ActionItem>,
    /// Most severe first, at most five.
    pub warning_items: Vec<ActionItem>,
}

pub fn inventory_stats(items: &[InventoryItem]) -> InventoryStats {
    let mut stats = InventoryStats {
        total: items.len(),
        ..InventoryStats::default()
    };
    for item in items {
        stats.total_value += item.stock_value();
        match item.status() {
            StockStatus::Healthy => stats.healthy += 1,
            StockStatus::Warning => stats.warning += 1,
            StockStatus::Critical => stats.critical += 1,
        }
    }
    stats
}

pub fn dashboard_stats(items: &[InventoryItem]) -> DashboardStats {
    let mut stats = DashboardStats::default();

    for item in items {
        stats.stock_value += item.stock_value();

        let status = item.status();
        let bucket = match status {
            StockStatus::Healthy => {
                stats.healthy += 1;
                continue;
            }
            StockStatus::Warning => {
                stats.warning += 1;
                &mut stats.warning_items
            }
            StockStatus::Critical => {
                stats.critical += 1;
                &mut stats.critical_items
            }
        };

        // Non-healthy always implies a non-zero target.
        let desired_count = item.desired_count.unwrap_or_default();
        bucket.push(ActionItem {
            id: item.id,
            name: item.name.clone(),
            count: item.count,
            desired_count,
            location: item.location.clone().unwrap_or_else(|| "Unknown".to_string()),
            category: Some(item.category.clone()).filter(|c| !c.is_empty()),
            status,
        });
    }

    for bucket in [&mut stats.critical_items, &mut stats.warning_items] {
        bucket.sort_by(|a, b| a.ratio().total_cmp(&b.ratio()));
        bucket.truncate(ACTION_ITEM_LIMIT);
    }

    stats
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;

    pub(crate) fn item(name: &str, count: f64, desired: Option<f64>, unit_cost: f64) -> InventoryItem {
        let now = Utc::now();
        InventoryItem {
            id: ItemId::new(),
            name: name.to_string(),
            category: "Ingredients".to_string(),
            category_id: None,
            sub_category: None,
            sub_category_id: None,
            location: Some("Rear Storage".to_string()),
            location_id: None,
            count,
            uom: "ea".to_string(),
            pkg_size: None,
            price: None,
            unit_cost,
            desired_count: desired,
            reorder_point: None,
            lead_time: None,
            source: None,
            staff: None,
            gram_conversion: None,
            notes: None,
            needs_review: false,
            review_source: None,
            reviewed_by: None,
            reviewed_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            created_by: None,
            updated_by: None,
        }
    }

    #[test]
    fn inventory_stats_counts_and_values() {
        let items = vec![
            item("a", 10.0, None, 2.0),
            item("b", 1.0, Some(10.0), 1.0),
            item("c", 4.0, Some(10.0), 0.5),
            item("d", 8.0, Some(10.0), 0.0),
        ];
        let stats = inventory_stats(&items);
        assert_eq!(stats.total, 4);
        assert_eq!((stats.healthy, stats.warning, stats.critical), (2, 1, 1));
        assert_eq!(stats.total_value, 23.0);
    }

    #[test]
    fn action_items_sorted_by_severity_and_capped() {
        let mut items: Vec<_> = (0..7)
            .map(|i| item(&format!("c{i}"), i as f64, Some(100.0), 1.0))
            .collect();
        items.reverse();
        items.push(item("w", 30.0, Some(100.0), 1.0));

        let stats = dashboard_stats(&items);
        assert_eq!(stats.critical, 7);
        assert_eq!(stats.warning, 1);
        assert_eq!(stats.critical_items.len(), 5);
        let names: Vec<_> = stats.critical_items.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["c0", "c1", "c2", "c3", "c4"]);
        assert_eq!(stats.warning_items[0].status, StockStatus::Warning);
    }

    #[test]
    fn missing_location_reads_unknown() {
        let mut low = item("x", 0.0, Some(4.0), 1.0);
        low.location = None;
        let stats = dashboard_stats(&[low]);
        assert_eq!(stats.critical_items[0].location, "Unknown");
    }

    #[test]
    fn dashboard_and_list_stats_agree() {
        let items = vec![
            item("a", 20.0, Some(100.0), 1.0),
            item("b", 21.0, Some(100.0), 1.0),
            item("c", 50.0, Some(100.0), 1.0),
            item("d", 51.0, Some(100.0), 1.0),
            item("e", 0.0, Some(0.0), 1.0),
        ];
        let list = inventory_stats(&items);
        let dash = dashboard_stats(&items);
        assert_eq!(
            (list.healthy, list.warning, list.critical),
            (dash.healthy, dash.warning, dash.critical)
        );
        assert_eq!(list.total_value, dash.stock_value);
    }
}
