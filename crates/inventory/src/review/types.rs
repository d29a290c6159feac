use serde::{Deserialize, Serialize};

use npi_core::{DomainError, DomainResult, ItemId, LocationId};

use crate::item::InventoryItem;

/// One row of the review queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub id: ItemId,
    pub name: String,
    pub category_name: String,
    pub sub_category_name: Option<String>,
    pub location_name: Option<String>,
    pub count: f64,
    pub uom: String,
    pub unit_cost: Option<f64>,
    pub desired_count: Option<f64>,
    pub source: Option<String>,
    pub review_source: Option<String>,
    pub notes: Option<String>,
}

impl From<&InventoryItem> for ReviewItem {
    fn from(item: &InventoryItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            category_name: item.category.clone(),
            sub_category_name: item.sub_category.clone(),
            location_name: item.location.clone(),
            count: item.count,
            uom: item.uom.clone(),
            unit_cost: Some(item.unit_cost),
            desired_count: item.desired_count,
            source: item.source.clone(),
            review_source: item.review_source.clone(),
            notes: item.notes.clone(),
        }
    }
}

/// Queue order: by review source (unset last), then by name.
pub fn sort_review_queue(items: &mut [ReviewItem]) {
    items.sort_by(|a, b| {
        let source = match (&a.review_source, &b.review_source) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => core::cmp::Ordering::Less,
            (None, Some(_)) => core::cmp::Ordering::Greater,
            (None, None) => core::cmp::Ordering::Equal,
        };
        source.then_with(|| a.name.cmp(&b.name))
    });
}

/// Terminal outcome for the current queue item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    /// Persist the edited draft and clear the flag.
    Complete,
    /// Clear the flag without applying edits.
    Skip,
    /// Clear the flag and soft-delete the item.
    Archive,
}

impl ReviewAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewAction::Complete => "complete",
            ReviewAction::Skip => "skip",
            ReviewAction::Archive => "archive",
        }
    }
}

impl core::str::FromStr for ReviewAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complete" => Ok(ReviewAction::Complete),
            "skip" => Ok(ReviewAction::Skip),
            "archive" => Ok(ReviewAction::Archive),
            other => Err(DomainError::unknown("review action", other)),
        }
    }
}

/// Field values confirmed by the operator on `complete`.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewUpdates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<LocationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ReviewUpdates {
    pub fn validate(&self) -> DomainResult<()> {
        for (field, value) in [
            ("count", self.count),
            ("unit_cost", self.unit_cost),
            ("desired_count", self.desired_count),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(DomainError::Negative(field));
                }
            }
        }
        if self.uom.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return Err(DomainError::Required("uom"));
        }
        Ok(())
    }
}

/// Body of `PATCH /review`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub item_id: ItemId,
    pub action: ReviewAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updates: Option<ReviewUpdates>,
}
