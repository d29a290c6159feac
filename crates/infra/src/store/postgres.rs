//! Postgres-backed inventory store.
//!
//! Reads and plain inserts are SQL against `npi_items_view`, `npi_items` and
//! `stock_movements`. Writes that must update an item and append a movement
//! atomically call the datastore procedures, which own that transaction:
//!
//! | Procedure | Arguments |
//! |-----------|-----------|
//! | `restock_item` | `p_item_id, p_quantity, p_notes, p_actor` |
//! | `adjust_stock` | `p_item_id, p_new_count, p_notes, p_actor` |
//! | `complete_item_review` | `p_item_id, p_updates jsonb, p_actor` |
//! | `skip_item_review` | `p_item_id, p_deactivate, p_actor` |
//!
//! Each returns the updated `npi_items` row; the adapter re-reads it through
//! the view to pick up denormalized names.
//!
//! ## Error Mapping
//!
//! | SQLSTATE | StoreError |
//! |----------|------------|
//! | `23505` unique violation | `Conflict` |
//! | `23503` / `23514` foreign key / check | `Validation` |
//! | `P0002` no data found (raised by procedures) | `NotFound` |
//! | anything else | `Database` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use tracing::{Span, instrument};
use uuid::Uuid;

use npi_core::{CategoryId, ItemId, LocationId, MovementId, SubCategoryId, UserId};
use npi_inventory::{
    AdjustStock, Category, InventoryItem, ItemDetails, Location, MovementType, NewItem, Restock,
    ReviewItem, ReviewUpdates, StockMovement, SubCategory, check_sub_category,
};

use super::{InventoryStore, StoreError, StoreResult};

const ITEM_COLUMNS: &str = r#"
    id, name, category, category_id, sub_category_id, sub_category_name, location, location_id,
    count::float8 AS count, uom, pkg_size::float8 AS pkg_size, price::float8 AS price,
    unit_cost::float8 AS unit_cost, desired_count::float8 AS desired_count,
    reorder_point::float8 AS reorder_point, lead_time, source, staff,
    gram_conversion::float8 AS gram_conversion, notes, needs_review, review_source,
    reviewed_by, reviewed_at, is_active, created_at, updated_at, created_by, updated_by
"#;

const MOVEMENT_COLUMNS: &str = r#"
    id, npi_item_id, previous_count::float8 AS previous_count, new_count::float8 AS new_count,
    quantity::float8 AS quantity, movement_type, notes, created_at, created_by
"#;

#[derive(Debug, Clone)]
pub struct PostgresInventoryStore {
    pool: Arc<PgPool>,
}

impl PostgresInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    async fn fetch_item(&self, id: Uuid) -> StoreResult<Option<InventoryItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM npi_items_view WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_item", e))?;
        row.map(|r| decode::<ItemRow>(&r).map(InventoryItem::from)).transpose()
    }

    async fn reread(&self, operation: &str, id: Option<Uuid>) -> StoreResult<InventoryItem> {
        let id = id.ok_or_else(|| StoreError::NotFound(format!("{operation}: item")))?;
        self.fetch_item(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("item {id}")))
    }

    /// Sub-category must exist and belong to the item's category.
    async fn check_sub_category(
        &self,
        category_id: CategoryId,
        sub_category_id: Option<SubCategoryId>,
    ) -> StoreResult<()> {
        let Some(sub_id) = sub_category_id else {
            return Ok(());
        };
        let row = sqlx::query("SELECT id, category_id, name FROM sub_categories WHERE id = $1")
            .bind(sub_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("check_sub_category", e))?
            .ok_or_else(|| StoreError::Validation(format!("unknown sub-category {sub_id}")))?;
        let sub = SubCategory::from(decode::<SubCategoryRow>(&row)?);
        check_sub_category(&sub, category_id)?;
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    #[instrument(skip(self), err)]
    async fn categories(&self) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, color, icon FROM categories ORDER BY name")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("categories", e))?;
        rows.iter()
            .map(|r| decode::<CategoryRow>(r).map(Category::from))
            .collect()
    }

    #[instrument(skip(self), err)]
    async fn sub_categories(&self) -> StoreResult<Vec<SubCategory>> {
        let rows = sqlx::query("SELECT id, category_id, name FROM sub_categories ORDER BY name")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("sub_categories", e))?;
        rows.iter()
            .map(|r| decode::<SubCategoryRow>(r).map(SubCategory::from))
            .collect()
    }

    #[instrument(skip(self), err)]
    async fn locations(&self) -> StoreResult<Vec<Location>> {
        let rows = sqlx::query("SELECT id, name, description FROM locations ORDER BY name")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("locations", e))?;
        rows.iter()
            .map(|r| decode::<LocationRow>(r).map(Location::from))
            .collect()
    }

    #[instrument(skip(self), fields(item_count), err)]
    async fn list_items(&self) -> StoreResult<Vec<InventoryItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM npi_items_view WHERE is_active = true ORDER BY lower(name)"
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_items", e))?;
        let items = rows
            .iter()
            .map(|r| decode::<ItemRow>(r).map(InventoryItem::from))
            .collect::<StoreResult<Vec<_>>>()?;
        Span::current().record("item_count", items.len());
        Ok(items)
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn get_item(&self, id: ItemId) -> StoreResult<InventoryItem> {
        self.fetch_item(*id.as_uuid())
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("item {id}")))
    }

    #[instrument(skip(self), err)]
    async fn find_active_by_name(&self, name: &str) -> StoreResult<Option<InventoryItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM npi_items_view \
             WHERE is_active = true AND lower(name) = lower($1) LIMIT 1"
        );
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_active_by_name", e))?;
        row.map(|r| decode::<ItemRow>(&r).map(InventoryItem::from)).transpose()
    }

    #[instrument(skip(self, item), fields(name = %item.details.name), err)]
    async fn insert_item(&self, item: NewItem, actor: Option<UserId>) -> StoreResult<InventoryItem> {
        let d = &item.details;
        self.check_sub_category(d.category_id, d.sub_category_id).await?;

        let new_id = ItemId::new();
        let id: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO npi_items (
                id, name, category, category_id, sub_category_id, location, location_id,
                count, uom, pkg_size, price, unit_cost, desired_count, reorder_point,
                lead_time, source, staff, gram_conversion, notes, needs_review,
                review_source, is_active, created_by, updated_by
            )
            SELECT
                $1, $2, c.name, c.id, $4, l.name, l.id,
                $6, $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18,
                $19, true, $20, $20
            FROM categories c, locations l
            WHERE c.id = $3 AND l.id = $5
            RETURNING id
            "#,
        )
        .bind(new_id.as_uuid())
        .bind(d.name.trim())
        .bind(d.category_id.as_uuid())
        .bind(d.sub_category_id.map(Uuid::from))
        .bind(d.location_id.as_uuid())
        .bind(item.count)
        .bind(&d.uom)
        .bind(item.pkg_size)
        .bind(item.price)
        .bind(d.unit_cost)
        .bind(d.desired_count)
        .bind(d.reorder_point)
        .bind(&item.lead_time)
        .bind(&item.source)
        .bind(&item.staff)
        .bind(d.gram_conversion)
        .bind(&item.notes)
        .bind(item.needs_review)
        .bind(&item.review_source)
        .bind(actor.map(Uuid::from))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_item", e))?;

        let id = id.ok_or_else(|| StoreError::Validation("unknown category or location".to_string()))?;
        self.reread("insert_item", Some(id)).await
    }

    #[instrument(skip(self, details), fields(item_id = %id), err)]
    async fn update_item(
        &self,
        id: ItemId,
        details: ItemDetails,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem> {
        details.validate()?;
        self.get_item(id).await?;
        self.check_sub_category(details.category_id, details.sub_category_id).await?;

        let updated: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE npi_items SET
                name = $2,
                category = c.name,
                category_id = c.id,
                sub_category_id = $4,
                location = l.name,
                location_id = l.id,
                uom = $6,
                desired_count = $7,
                reorder_point = $8,
                unit_cost = $9,
                gram_conversion = $10,
                updated_by = $11,
                updated_at = NOW()
            FROM categories c, locations l
            WHERE npi_items.id = $1 AND c.id = $3 AND l.id = $5
            RETURNING npi_items.id
            "#,
        )
        .bind(id.as_uuid())
        .bind(details.name.trim())
        .bind(details.category_id.as_uuid())
        .bind(details.sub_category_id.map(Uuid::from))
        .bind(details.location_id.as_uuid())
        .bind(&details.uom)
        .bind(details.desired_count)
        .bind(details.reorder_point)
        .bind(details.unit_cost)
        .bind(details.gram_conversion)
        .bind(actor.map(Uuid::from))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_item", e))?;

        let id = updated.ok_or_else(|| StoreError::Validation("unknown category or location".to_string()))?;
        self.reread("update_item", Some(id)).await
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn deactivate_item(&self, id: ItemId, actor: Option<UserId>) -> StoreResult<InventoryItem> {
        let updated: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE npi_items SET is_active = false, updated_by = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id.as_uuid())
        .bind(actor.map(Uuid::from))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("deactivate_item", e))?;
        self.reread("deactivate_item", updated).await
    }

    #[instrument(skip(self, restock), fields(item_id = %id, quantity = restock.quantity), err)]
    async fn restock(
        &self,
        id: ItemId,
        restock: Restock,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem> {
        restock.validate()?;
        let updated: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM restock_item($1, $2, $3, $4)")
                .bind(id.as_uuid())
                .bind(restock.quantity)
                .bind(&restock.notes)
                .bind(actor.map(Uuid::from))
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("restock_item", e))?;
        self.reread("restock", updated).await
    }

    #[instrument(skip(self, adjust), fields(item_id = %id, new_count = adjust.new_count), err)]
    async fn adjust_stock(
        &self,
        id: ItemId,
        adjust: AdjustStock,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem> {
        adjust.validate()?;
        let updated: Option<Uuid> = sqlx::query_scalar("SELECT id FROM adjust_stock($1, $2, $3, $4)")
            .bind(id.as_uuid())
            .bind(adjust.new_count)
            .bind(&adjust.notes)
            .bind(actor.map(Uuid::from))
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("adjust_stock", e))?;
        self.reread("adjust_stock", updated).await
    }

    #[instrument(skip(self, movement), fields(item_id = %movement.item_id), err)]
    async fn record_movement(&self, movement: StockMovement) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                id, npi_item_id, previous_count, new_count, quantity,
                movement_type, notes, created_at, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(movement.id.as_uuid())
        .bind(movement.item_id.as_uuid())
        .bind(movement.previous_count)
        .bind(movement.new_count)
        .bind(movement.quantity_delta)
        .bind(movement.movement_type.as_str())
        .bind(&movement.notes)
        .bind(movement.created_at)
        .bind(movement.created_by.map(Uuid::from))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("record_movement", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn movements_for_item(&self, id: ItemId) -> StoreResult<Vec<StockMovement>> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements \
             WHERE npi_item_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("movements_for_item", e))?;
        rows.iter()
            .map(|r| decode::<MovementRow>(r).and_then(StockMovement::try_from))
            .collect()
    }

    #[instrument(skip(self), err)]
    async fn recent_movements(&self, limit: usize) -> StoreResult<Vec<StockMovement>> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements ORDER BY created_at DESC LIMIT $1"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("recent_movements", e))?;
        rows.iter()
            .map(|r| decode::<MovementRow>(r).and_then(StockMovement::try_from))
            .collect()
    }

    #[instrument(skip(self), err)]
    async fn review_queue(&self) -> StoreResult<Vec<ReviewItem>> {
        let rows = sqlx::query(
            r#"
            SELECT
                id, name, category AS category_name, sub_category_name,
                location AS location_name, count::float8 AS count, uom,
                unit_cost::float8 AS unit_cost, desired_count::float8 AS desired_count,
                source, review_source, notes
            FROM npi_items_view
            WHERE needs_review = true AND is_active = true
            ORDER BY review_source ASC NULLS LAST, name ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("review_queue", e))?;
        rows.iter()
            .map(|r| decode::<ReviewRow>(r).map(ReviewItem::from))
            .collect()
    }

    #[instrument(skip(self, updates), fields(item_id = %id), err)]
    async fn complete_review(
        &self,
        id: ItemId,
        updates: ReviewUpdates,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem> {
        updates.validate()?;
        let payload = serde_json::to_value(&updates)
            .map_err(|e| StoreError::Validation(format!("updates serialization failed: {e}")))?;
        let updated: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM complete_item_review($1, $2, $3)")
                .bind(id.as_uuid())
                .bind(payload)
                .bind(actor.map(Uuid::from))
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("complete_item_review", e))?;
        self.reread("complete_review", updated).await
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn skip_review(
        &self,
        id: ItemId,
        deactivate: bool,
        actor: Option<UserId>,
    ) -> StoreResult<InventoryItem> {
        let updated: Option<Uuid> = sqlx::query_scalar("SELECT id FROM skip_item_review($1, $2, $3)")
            .bind(id.as_uuid())
            .bind(deactivate)
            .bind(actor.map(Uuid::from))
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("skip_item_review", e))?;
        self.reread("skip_review", updated).await
    }
}

fn decode<'r, T: FromRow<'r, PgRow>>(row: &'r PgRow) -> StoreResult<T> {
    T::from_row(row).map_err(|e| StoreError::Database(format!("failed to decode row: {e}")))
}

/// Map SQLx errors to `StoreError` by SQLSTATE.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("{operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23503") | Some("23514") => StoreError::Validation(msg),
                Some("P0002") => StoreError::NotFound(msg),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::RowNotFound => StoreError::NotFound(operation.to_string()),
        sqlx::Error::PoolClosed => StoreError::Database(format!("connection pool closed in {operation}")),
        other => StoreError::Database(format!("sqlx error in {operation}: {other}")),
    }
}

// SQLx row types

#[derive(Debug)]
struct ItemRow {
    id: Uuid,
    name: String,
    category: String,
    category_id: Option<Uuid>,
    sub_category_id: Option<Uuid>,
    sub_category_name: Option<String>,
    location: Option<String>,
    location_id: Option<Uuid>,
    count: f64,
    uom: String,
    pkg_size: Option<f64>,
    price: Option<f64>,
    unit_cost: f64,
    desired_count: Option<f64>,
    reorder_point: Option<f64>,
    lead_time: Option<String>,
    source: Option<String>,
    staff: Option<String>,
    gram_conversion: Option<f64>,
    notes: Option<String>,
    needs_review: Option<bool>,
    review_source: Option<String>,
    reviewed_by: Option<Uuid>,
    reviewed_at: Option<DateTime<Utc>>,
    is_active: Option<bool>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    created_by: Option<Uuid>,
    updated_by: Option<Uuid>,
}

impl<'r> FromRow<'r, PgRow> for ItemRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ItemRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            category_id: row.try_get("category_id")?,
            sub_category_id: row.try_get("sub_category_id")?,
            sub_category_name: row.try_get("sub_category_name")?,
            location: row.try_get("location")?,
            location_id: row.try_get("location_id")?,
            count: row.try_get("count")?,
            uom: row.try_get("uom")?,
            pkg_size: row.try_get("pkg_size")?,
            price: row.try_get("price")?,
            unit_cost: row.try_get("unit_cost")?,
            desired_count: row.try_get("desired_count")?,
            reorder_point: row.try_get("reorder_point")?,
            lead_time: row.try_get("lead_time")?,
            source: row.try_get("source")?,
            staff: row.try_get("staff")?,
            gram_conversion: row.try_get("gram_conversion")?,
            notes: row.try_get("notes")?,
            needs_review: row.try_get("needs_review")?,
            review_source: row.try_get("review_source")?,
            reviewed_by: row.try_get("reviewed_by")?,
            reviewed_at: row.try_get("reviewed_at")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            created_by: row.try_get("created_by")?,
            updated_by: row.try_get("updated_by")?,
        })
    }
}

impl From<ItemRow> for InventoryItem {
    fn from(row: ItemRow) -> Self {
        let created_at = row.created_at.unwrap_or_else(Utc::now);
        InventoryItem {
            id: ItemId::from_uuid(row.id),
            name: row.name,
            category: row.category,
            category_id: row.category_id.map(CategoryId::from_uuid),
            sub_category: row.sub_category_name,
            sub_category_id: row.sub_category_id.map(SubCategoryId::from_uuid),
            location: row.location,
            location_id: row.location_id.map(LocationId::from_uuid),
            count: row.count,
            uom: row.uom,
            pkg_size: row.pkg_size,
            price: row.price,
            unit_cost: row.unit_cost,
            desired_count: row.desired_count,
            reorder_point: row.reorder_point,
            lead_time: row.lead_time,
            source: row.source,
            staff: row.staff,
            gram_conversion: row.gram_conversion,
            notes: row.notes,
            needs_review: row.needs_review.unwrap_or(false),
            review_source: row.review_source,
            reviewed_by: row.reviewed_by.map(UserId::from_uuid),
            reviewed_at: row.reviewed_at,
            is_active: row.is_active.unwrap_or(true),
            created_at,
            updated_at: row.updated_at.unwrap_or(created_at),
            created_by: row.created_by.map(UserId::from_uuid),
            updated_by: row.updated_by.map(UserId::from_uuid),
        }
    }
}

#[derive(Debug)]
struct ReviewRow {
    id: Uuid,
    name: String,
    category_name: String,
    sub_category_name: Option<String>,
    location_name: Option<String>,
    count: f64,
    uom: String,
    unit_cost: Option<f64>,
    desired_count: Option<f64>,
    source: Option<String>,
    review_source: Option<String>,
    notes: Option<String>,
}

impl<'r> FromRow<'r, PgRow> for ReviewRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ReviewRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            category_name: row.try_get("category_name")?,
            sub_category_name: row.try_get("sub_category_name")?,
            location_name: row.try_get("location_name")?,
            count: row.try_get("count")?,
            uom: row.try_get("uom")?,
            unit_cost: row.try_get("unit_cost")?,
            desired_count: row.try_get("desired_count")?,
            source: row.try_get("source")?,
            review_source: row.try_get("review_source")?,
            notes: row.try_get("notes")?,
        })
    }
}

impl From<ReviewRow> for ReviewItem {
    fn from(row: ReviewRow) -> Self {
        ReviewItem {
            id: ItemId::from_uuid(row.id),
            name: row.name,
            category_name: row.category_name,
            sub_category_name: row.sub_category_name,
            location_name: row.location_name,
            count: row.count,
            uom: row.uom,
            unit_cost: row.unit_cost,
            desired_count: row.desired_count,
            source: row.source,
            review_source: row.review_source,
            notes: row.notes,
        }
    }
}

#[derive(Debug)]
struct MovementRow {
    id: Uuid,
    npi_item_id: Uuid,
    previous_count: f64,
    new_count: f64,
    quantity: f64,
    movement_type: String,
    notes: Option<String>,
    created_at: Option<DateTime<Utc>>,
    created_by: Option<Uuid>,
}

impl<'r> FromRow<'r, PgRow> for MovementRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(MovementRow {
            id: row.try_get("id")?,
            npi_item_id: row.try_get("npi_item_id")?,
            previous_count: row.try_get("previous_count")?,
            new_count: row.try_get("new_count")?,
            quantity: row.try_get("quantity")?,
            movement_type: row.try_get("movement_type")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
            created_by: row.try_get("created_by")?,
        })
    }
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = StoreError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let movement_type: MovementType = row
            .movement_type
            .parse()
            .map_err(|e| StoreError::Database(format!("stored movement row {}: {e}", row.id)))?;
        Ok(StockMovement {
            id: MovementId::from_uuid(row.id),
            item_id: ItemId::from_uuid(row.npi_item_id),
            previous_count: row.previous_count,
            new_count: row.new_count,
            quantity_delta: row.quantity,
            movement_type,
            notes: row.notes,
            created_at: row.created_at.unwrap_or_else(Utc::now),
            created_by: row.created_by.map(UserId::from_uuid),
        })
    }
}

#[derive(Debug)]
struct CategoryRow {
    id: Uuid,
    name: String,
    color: String,
    icon: Option<String>,
}

impl<'r> FromRow<'r, PgRow> for CategoryRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CategoryRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            color: row.try_get("color")?,
            icon: row.try_get("icon")?,
        })
    }
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: CategoryId::from_uuid(row.id),
            name: row.name,
            color: row.color,
            icon: row.icon,
        }
    }
}

#[derive(Debug)]
struct SubCategoryRow {
    id: Uuid,
    category_id: Uuid,
    name: String,
}

impl<'r> FromRow<'r, PgRow> for SubCategoryRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(SubCategoryRow {
            id: row.try_get("id")?,
            category_id: row.try_get("category_id")?,
            name: row.try_get("name")?,
        })
    }
}

impl From<SubCategoryRow> for SubCategory {
    fn from(row: SubCategoryRow) -> Self {
        SubCategory {
            id: SubCategoryId::from_uuid(row.id),
            category_id: CategoryId::from_uuid(row.category_id),
            name: row.name,
        }
    }
}

#[derive(Debug)]
struct LocationRow {
    id: Uuid,
    name: String,
    description: Option<String>,
}

impl<'r> FromRow<'r, PgRow> for LocationRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(LocationRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
        })
    }
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Location {
            id: LocationId::from_uuid(row.id),
            name: row.name,
            description: row.description,
        }
    }
}
