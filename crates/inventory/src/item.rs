use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use npi_core::{
    CategoryId, DomainError, DomainResult, Entity, ItemId, LocationId, SubCategoryId, UserId,
};

use crate::status::{StockStatus, classify, stock_ratio};

const MAX_NAME_LEN: usize = 100;
const MAX_NOTES_LEN: usize = 500;

/// Supply category (Ingredients, Packaging, Labels, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
}

/// Sub-category; belongs to exactly one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCategory {
    pub id: SubCategoryId,
    pub category_id: CategoryId,
    pub name: String,
}

/// Physical storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub description: Option<String>,
}

/// A tracked consumable supply.
///
/// `category`, `sub_category` and `location` are denormalized names kept next
/// to their keys so list views never need a join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub category_id: Option<CategoryId>,
    pub sub_category: Option<String>,
    pub sub_category_id: Option<SubCategoryId>,
    pub location: Option<String>,
    pub location_id: Option<LocationId>,
    pub count: f64,
    pub uom: String,
    pub pkg_size: Option<f64>,
    pub price: Option<f64>,
    pub unit_cost: f64,
    pub desired_count: Option<f64>,
    pub reorder_point: Option<f64>,
    pub lead_time: Option<String>,
    pub source: Option<String>,
    pub staff: Option<String>,
    pub gram_conversion: Option<f64>,
    pub notes: Option<String>,
    pub needs_review: bool,
    pub review_source: Option<String>,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
    pub updated_by: Option<UserId>,
}

impl InventoryItem {
    pub fn status(&self) -> StockStatus {
        classify(self.count, self.desired_count)
    }

    /// `count / desired_count`, when a target is set.
    pub fn stock_ratio(&self) -> Option<f64> {
        stock_ratio(self.count, self.desired_count)
    }

    pub fn stock_value(&self) -> f64 {
        self.count * self.unit_cost
    }
}

impl Entity for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> ItemId {
        self.id
    }
}

/// Editable attributes shared by manual creation and updates.
///
/// Stock counts are deliberately absent: they only change through restock,
/// adjustment or review completion so every change leaves a movement behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetails {
    pub name: String,
    pub category_id: CategoryId,
    #[serde(default)]
    pub sub_category_id: Option<SubCategoryId>,
    pub location_id: LocationId,
    pub uom: String,
    #[serde(default)]
    pub desired_count: Option<f64>,
    #[serde(default)]
    pub reorder_point: Option<f64>,
    pub unit_cost: f64,
    #[serde(default)]
    pub gram_conversion: Option<f64>,
}

impl ItemDetails {
    pub fn validate(&self) -> DomainResult<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::Required("name"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::TooLong {
                field: "name",
                max: MAX_NAME_LEN,
            });
        }
        if self.uom.trim().is_empty() {
            return Err(DomainError::Required("uom"));
        }
        non_negative("unit_cost", Some(self.unit_cost))?;
        non_negative("desired_count", self.desired_count)?;
        non_negative("reorder_point", self.reorder_point)?;
        if let Some(g) = self.gram_conversion {
            if !g.is_finite() || g <= 0.0 {
                return Err(DomainError::NotPositive("gram_conversion"));
            }
        }
        Ok(())
    }
}

/// A record ready to be inserted, from manual entry or the workbook import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    #[serde(flatten)]
    pub details: ItemDetails,
    pub count: f64,
    #[serde(default)]
    pub pkg_size: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub lead_time: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub staff: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub needs_review: bool,
    #[serde(default)]
    pub review_source: Option<String>,
}

impl NewItem {
    pub fn new(details: ItemDetails, count: f64) -> Self {
        Self {
            details,
            count,
            pkg_size: None,
            price: None,
            lead_time: None,
            source: None,
            staff: None,
            notes: None,
            needs_review: false,
            review_source: None,
        }
    }

    /// Manual-entry rules. The workbook import does not apply them.
    pub fn validate(&self) -> DomainResult<()> {
        self.details.validate()?;
        non_negative("count", Some(self.count))
    }
}

/// Stock received: `count += quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restock {
    pub quantity: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Restock {
    pub fn validate(&self) -> DomainResult<()> {
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(DomainError::NotPositive("quantity"));
        }
        notes_len(self.notes.as_deref())
    }
}

/// Physical recount: `count = new_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustStock {
    pub new_count: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AdjustStock {
    pub fn validate(&self) -> DomainResult<()> {
        non_negative("new_count", Some(self.new_count))?;
        notes_len(self.notes.as_deref())
    }
}

/// An item's sub-category must belong to the item's own category.
pub fn check_sub_category(sub: &SubCategory, category_id: CategoryId) -> DomainResult<()> {
    if sub.category_id != category_id {
        return Err(DomainError::SubCategoryMismatch(sub.name.clone()));
    }
    Ok(())
}

fn non_negative(field: &'static str, value: Option<f64>) -> DomainResult<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(DomainError::Negative(field)),
        _ => Ok(()),
    }
}

fn notes_len(notes: Option<&str>) -> DomainResult<()> {
    match notes {
        Some(n) if n.chars().count() > MAX_NOTES_LEN => Err(DomainError::TooLong {
            field: "notes",
            max: MAX_NOTES_LEN,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> ItemDetails {
        ItemDetails {
            name: "MCT Oil".to_string(),
            category_id: CategoryId::new(),
            sub_category_id: None,
            location_id: LocationId::new(),
            uom: "kg".to_string(),
            desired_count: Some(10.0),
            reorder_point: None,
            unit_cost: 4.5,
            gram_conversion: Some(1000.0),
        }
    }

    #[test]
    fn valid_details_pass() {
        assert!(details().validate().is_ok());
        assert!(NewItem::new(details(), 0.0).validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut d = details();
        d.name = "   ".to_string();
        assert_eq!(d.validate(), Err(DomainError::Required("name")));
    }

    #[test]
    fn long_name_is_rejected() {
        let mut d = details();
        d.name = "x".repeat(101);
        assert_eq!(
            d.validate(),
            Err(DomainError::TooLong { field: "name", max: 100 })
        );
    }

    #[test]
    fn negative_values_are_rejected() {
        let mut d = details();
        d.unit_cost = -1.0;
        assert!(d.validate().is_err());

        assert!(NewItem::new(details(), -0.5).validate().is_err());
    }

    #[test]
    fn gram_conversion_must_be_positive() {
        let mut d = details();
        d.gram_conversion = Some(0.0);
        assert!(d.validate().is_err());
    }

    #[test]
    fn restock_requires_positive_quantity() {
        assert!(Restock { quantity: 0.0, notes: None }.validate().is_err());
        assert!(Restock { quantity: 2.5, notes: None }.validate().is_ok());
        let long = Some("n".repeat(501));
        assert!(Restock { quantity: 1.0, notes: long }.validate().is_err());
    }

    #[test]
    fn adjust_allows_zero() {
        assert!(AdjustStock { new_count: 0.0, notes: None }.validate().is_ok());
        assert!(AdjustStock { new_count: -1.0, notes: None }.validate().is_err());
    }

    #[test]
    fn sub_category_must_match_category() {
        let category_id = CategoryId::new();
        let sub = SubCategory {
            id: SubCategoryId::new(),
            category_id,
            name: "Oils".to_string(),
        };
        assert!(check_sub_category(&sub, category_id).is_ok());
        assert!(matches!(
            check_sub_category(&sub, CategoryId::new()),
            Err(DomainError::SubCategoryMismatch(_))
        ));
    }

    #[test]
    fn new_item_json_flattens_details() {
        let json = serde_json::json!({
            "name": "Vanilla",
            "category_id": CategoryId::new(),
            "location_id": LocationId::new(),
            "uom": "ml",
            "unit_cost": 0.2,
            "count": 12.0
        });
        let item: NewItem = serde_json::from_value(json).unwrap();
        assert_eq!(item.details.name, "Vanilla");
        assert_eq!(item.count, 12.0);
        assert!(!item.needs_review);
    }
}
