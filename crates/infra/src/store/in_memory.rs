use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use npi_core::{CategoryId, ItemId, LocationId, SubCategoryId, UserId};
use npi_inventory::{
    AdjustStock, Category, InventoryItem, ItemDetails, Location, NewItem, Restock, ReviewItem,
    ReviewUpdates, StockMovement, SubCategory, check_sub_category, sort_review_queue,
};

use super::{InventoryStore, StoreError, StoreResult};

const REVIEW_ADJUSTMENT_NOTE: &str = "Count confirmed during review";

const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Ingredients", "#16a34a"),
    ("Packaging", "#2563eb"),
    ("Labels", "#9333ea"),
    ("White Label", "#64748b"),
    ("Supplies", "#ea580c"),
];

const DEFAULT_LOCATIONS: &[&str] = &[
    "Rear Storage",
    "Office",
    "Restroom Storage",
    "Extraction Room",
    "Gummy Room",
    "Formulation Room",
];

#[derive(Debug, Default)]
struct State {
    categories: Vec<Category>,
    sub_categories: Vec<SubCategory>,
    locations: Vec<Location>,
    items: HashMap<ItemId, InventoryItem>,
    /// Append order; oldest first.
    movements: Vec<StockMovement>,
}

/// Denormalized reference names for an item write.
struct Names {
    category: String,
    sub_category: Option<String>,
    location: String,
}

impl State {
    fn resolve(
        &self,
        category_id: CategoryId,
        sub_category_id: Option<SubCategoryId>,
        location_id: LocationId,
    ) -> StoreResult<Names> {
        let category = self
            .categories
            .iter()
            .find(|c| c.id == category_id)
            .ok_or_else(|| StoreError::Validation(format!("unknown category {category_id}")))?;
        let location = self
            .locations
            .iter()
            .find(|l| l.id == location_id)
            .ok_or_else(|| StoreError::Validation(format!("unknown location {location_id}")))?;
        let sub_category = match sub_category_id {
            Some(id) => {
                let sub = self
                    .sub_categories
                    .iter()
                    .find(|s| s.id == id)
                    .ok_or_else(|| StoreError::Validation(format!("unknown sub-category {id}")))?;
                check_sub_category(sub, category_id)?;
                Some(sub.name.clone())
            }
            None => None,
        };
        Ok(Names {
            category: category.name.clone(),
            sub_category,
            location: location.name.clone(),
        })
    }

    fn item_mut(&mut self, id: ItemId) -> StoreResult<&mut InventoryItem> {
        self.items
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("item {id}")))
    }

    fn active_item_mut(&mut self, id: ItemId) -> StoreResult<&mut InventoryItem> {
        let item = self.item_mut(id)?;
        if !item.is_active {
            return Err(StoreError::NotFound(format!("item {id}")));
        }
        Ok(item)
    }
}

/// In-memory inventory store.
///
/// Intended for tests/dev. Mirrors the Postgres procedures' semantics,
/// including movement recording for count changes.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    state: RwLock<State>,
}

impl InMemoryInventoryStore {
    pub fn with_reference_data(
        categories: Vec<Category>,
        sub_categories: Vec<SubCategory>,
        locations: Vec<Location>,
    ) -> Self {
        Self {
            state: RwLock::new(State {
                categories,
                sub_categories,
                locations,
                ..State::default()
            }),
        }
    }

    /// Standard categories and storage locations, no sub-categories.
    pub fn seeded() -> Self {
        let categories = DEFAULT_CATEGORIES
            .iter()
            .map(|(name, color)| Category {
                id: CategoryId::new(),
                name: (*name).to_string(),
                color: (*color).to_string(),
                icon: None,
            })
            .collect();
        let locations = DEFAULT_LOCATIONS
            .iter()
            .map(|name| Location {
                id: LocationId::new(),
                name: (*name).to_string(),
                description: None,
            })
            .collect();
        Self::with_reference_data(categories, Vec::new(), locations)
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| StoreError::Database("lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| StoreError::Database("lock poisoned".to_string()))
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn categories(&self) -> StoreResult<Vec<Category>> {
        let mut out = self.read()?.categories.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn sub_categories(&self) -> StoreResult<Vec<SubCategory>> {
        let mut out = self.read()?.sub_categories.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn locations(&self) -> StoreResult<Vec<Location>> {
        let mut out = self.read()?.locations.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn list_items(&self) -> StoreResult<Vec<InventoryItem>> {
        let state = self.read()?;
        let mut out: Vec<_> = state.items.values().filter(|i| i.is_active).cloned().collect();
        out.sort_by_key(|i| i.name.to_lowercase());
        Ok(out)
    }

    async fn get_item(&self, id: ItemId) -> StoreResult<InventoryItem> {
        self.read()?
            .items
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("item {id}")))
    }

    async fn find_active_by_name(&self, name: &str) -> StoreResult<Option<InventoryItem>> {
        let needle = name.to_lowercase();
        Ok(self
            .read()?
            .items
            .values()
            .find(|i| i.is_active && i.name.to_lowercase() == needle)
            .cloned())
    }

    async fn insert_item(&self, item: NewItem, actor: Option<UserId>) -> StoreResult<InventoryItem> {
        let mut state = self.write()?;
        let d = &item.details;
        let names = state.resolve(d.category_id, d.sub_category_id, d.location_id)?;

        let now = Utc::now();
        let stored = InventoryItem {
            id: ItemId::new(),
            name: d.name.trim().to_string(),
            category: names.category,
            category_id: Some(d.category_id),
            sub_category: names.sub_category,
            sub_category_id: d.sub_category_id,
            location: Some(names.location),
            location_id: Some(d.location_id),
            count: item.count,
            uom: d.uom.clone(),
            pkg_size: item.pkg_size,
            price: item.price,
            unit_cost: d.unit_cost,
            desired_count: d.desired_count,
            reorder_point: d.reorder_point,
            lead_time: item.lead_time,
            source: item.source,
            staff: item.staff,
            gram_conversion: d.gram_conversion,
            notes: item.notes,
            needs_review: item.needs_review,
            review_source: item.review_source,
            reviewed_by: None,
            reviewed_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            created_by: actor,
            updated_by: actor,
        };
        state.items.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_item(
        &self,
        id: ItemId,
        details: ItemDetails,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem> {
        details.validate()?;
        let mut state = self.write()?;
        let names = state.resolve(details.category_id, details.sub_category_id, details.location_id)?;

        let item = state.item_mut(id)?;
        item.name = details.name.trim().to_string();
        item.category = names.category;
        item.category_id = Some(details.category_id);
        item.sub_category = names.sub_category;
        item.sub_category_id = details.sub_category_id;
        item.location = Some(names.location);
        item.location_id = Some(details.location_id);
        item.uom = details.uom;
        item.desired_count = details.desired_count;
        item.reorder_point = details.reorder_point;
        item.unit_cost = details.unit_cost;
        item.gram_conversion = details.gram_conversion;
        item.updated_at = Utc::now();
        item.updated_by = actor;
        Ok(item.clone())
    }

    async fn deactivate_item(&self, id: ItemId, actor: Option<UserId>) -> StoreResult<InventoryItem> {
        let mut state = self.write()?;
        let item = state.item_mut(id)?;
        item.is_active = false;
        item.updated_at = Utc::now();
        item.updated_by = actor;
        Ok(item.clone())
    }

    async fn restock(
        &self,
        id: ItemId,
        restock: Restock,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem> {
        restock.validate()?;
        let mut state = self.write()?;
        let now = Utc::now();
        let item = state.active_item_mut(id)?;
        let movement = StockMovement::restock(id, item.count, restock.quantity, restock.notes, actor, now)?;
        item.count = movement.new_count;
        item.updated_at = now;
        item.updated_by = actor;
        let updated = item.clone();
        state.movements.push(movement);
        Ok(updated)
    }

    async fn adjust_stock(
        &self,
        id: ItemId,
        adjust: AdjustStock,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem> {
        adjust.validate()?;
        let mut state = self.write()?;
        let now = Utc::now();
        let item = state.active_item_mut(id)?;
        let movement =
            StockMovement::adjustment(id, item.count, adjust.new_count, adjust.notes, actor, now)?;
        item.count = movement.new_count;
        item.updated_at = now;
        item.updated_by = actor;
        let updated = item.clone();
        state.movements.push(movement);
        Ok(updated)
    }

    async fn record_movement(&self, movement: StockMovement) -> StoreResult<()> {
        let mut state = self.write()?;
        if !state.items.contains_key(&movement.item_id) {
            return Err(StoreError::Validation(format!(
                "movement references unknown item {}",
                movement.item_id
            )));
        }
        state.movements.push(movement);
        Ok(())
    }

    async fn movements_for_item(&self, id: ItemId) -> StoreResult<Vec<StockMovement>> {
        Ok(self
            .read()?
            .movements
            .iter()
            .rev()
            .filter(|m| m.item_id == id)
            .cloned()
            .collect())
    }

    async fn recent_movements(&self, limit: usize) -> StoreResult<Vec<StockMovement>> {
        Ok(self.read()?.movements.iter().rev().take(limit).cloned().collect())
    }

    async fn review_queue(&self) -> StoreResult<Vec<ReviewItem>> {
        let state = self.read()?;
        let mut out: Vec<ReviewItem> = state
            .items
            .values()
            .filter(|i| i.needs_review && i.is_active)
            .map(ReviewItem::from)
            .collect();
        sort_review_queue(&mut out);
        Ok(out)
    }

    async fn complete_review(
        &self,
        id: ItemId,
        updates: ReviewUpdates,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem> {
        updates.validate()?;
        let mut state = self.write()?;
        let location = match updates.location_id {
            Some(location_id) => Some(
                state
                    .locations
                    .iter()
                    .find(|l| l.id == location_id)
                    .map(|l| (l.id, l.name.clone()))
                    .ok_or_else(|| StoreError::Validation(format!("unknown location {location_id}")))?,
            ),
            None => None,
        };

        let now = Utc::now();
        let item = state.item_mut(id)?;
        let movement = match updates.count {
            Some(count) if count != item.count => Some(StockMovement::adjustment(
                id,
                item.count,
                count,
                Some(REVIEW_ADJUSTMENT_NOTE.to_string()),
                actor,
                now,
            )?),
            _ => None,
        };

        if let Some(m) = &movement {
            item.count = m.new_count;
        }
        if let Some(unit_cost) = updates.unit_cost {
            item.unit_cost = unit_cost;
        }
        if let Some(uom) = updates.uom {
            item.uom = uom;
        }
        if let Some(desired_count) = updates.desired_count {
            item.desired_count = Some(desired_count);
        }
        if let Some((location_id, name)) = location {
            item.location_id = Some(location_id);
            item.location = Some(name);
        }
        if let Some(source) = updates.source {
            item.source = Some(source);
        }
        item.needs_review = false;
        item.reviewed_by = actor;
        item.reviewed_at = Some(now);
        item.updated_at = now;
        item.updated_by = actor;

        let updated = item.clone();
        state.movements.extend(movement);
        Ok(updated)
    }

    async fn skip_review(
        &self,
        id: ItemId,
        deactivate: bool,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem> {
        let mut state = self.write()?;
        let now = Utc::now();
        let item = state.item_mut(id)?;
        item.needs_review = false;
        item.reviewed_by = actor;
        item.reviewed_at = Some(now);
        if deactivate {
            item.is_active = false;
        }
        item.updated_at = now;
        item.updated_by = actor;
        Ok(item.clone())
    }
}
