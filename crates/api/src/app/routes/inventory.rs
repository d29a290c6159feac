use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::{JsonRejection, QueryRejection}},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use npi_inventory::{
    AdjustStock, ItemDetails, NewItem, Restock, StockMovement, filter_items, inventory_stats,
    sort_items,
};

use crate::app::dto::{self, ItemView, ListItemsQuery};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

const MANUAL_ENTRY_NOTE: &str = "Initial count";

pub fn router() -> Router {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/items", get(list_items).post(create_item))
        .route("/items/:id", get(get_item).put(update_item).delete(delete_item))
        .route("/items/:id/restock", post(restock_item))
        .route("/items/:id/adjust", post(adjust_stock))
        .route("/items/:id/movements", get(list_movements))
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<ListItemsQuery>, QueryRejection>,
) -> axum::response::Response {
    let query = match query {
        Ok(Query(q)) => q,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_query", e.body_text()),
    };

    let items = match services.store().list_items().await {
        Ok(items) => items,
        Err(e) => return errors::store_error_to_response(e),
    };
    let mut items = filter_items(&items, &query.filters());
    sort_items(
        &mut items,
        query.sort.unwrap_or_default(),
        query.dir.unwrap_or_default(),
    );

    let views: Vec<ItemView> = items.into_iter().map(ItemView::from).collect();
    Json(views).into_response()
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<NewItem>, JsonRejection>,
) -> axum::response::Response {
    let item = match errors::json_body(body) {
        Ok(item) => item,
        Err(resp) => return resp,
    };
    if let Err(e) = item.validate() {
        return errors::domain_error_to_response(e);
    }

    let store = services.store();
    let created = match store.insert_item(item, principal.actor()).await {
        Ok(created) => created,
        Err(e) => return errors::store_error_to_response(e),
    };

    if created.count > 0.0 {
        let movement = StockMovement::initial(
            created.id,
            created.count,
            Some(MANUAL_ENTRY_NOTE.to_string()),
            principal.actor(),
            Utc::now(),
        );
        let recorded = match movement {
            Ok(m) => store.record_movement(m).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = recorded {
            tracing::warn!(item_id = %created.id, error = %e, "initial movement not recorded");
        }
    }

    (StatusCode::CREATED, Json(ItemView::from(created))).into_response()
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.store().get_item(id).await {
        Ok(item) => Json(ItemView::from(item)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<ItemDetails>, JsonRejection>,
) -> axum::response::Response {
    let id = match dto::parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let details = match errors::json_body(body) {
        Ok(details) => details,
        Err(resp) => return resp,
    };
    if let Err(e) = details.validate() {
        return errors::domain_error_to_response(e);
    }

    match services.store().update_item(id, details, principal.actor()).await {
        Ok(item) => Json(ItemView::from(item)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Soft delete; the row and its movements stay in the datastore.
pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.store().deactivate_item(id, principal.actor()).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn restock_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<Restock>, JsonRejection>,
) -> axum::response::Response {
    let id = match dto::parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let restock = match errors::json_body(body) {
        Ok(restock) => restock,
        Err(resp) => return resp,
    };
    if let Err(e) = restock.validate() {
        return errors::domain_error_to_response(e);
    }

    match services.store().restock(id, restock, principal.actor()).await {
        Ok(item) => Json(ItemView::from(item)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn adjust_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<AdjustStock>, JsonRejection>,
) -> axum::response::Response {
    let id = match dto::parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let adjust = match errors::json_body(body) {
        Ok(adjust) => adjust,
        Err(resp) => return resp,
    };
    if let Err(e) = adjust.validate() {
        return errors::domain_error_to_response(e);
    }

    match services.store().adjust_stock(id, adjust, principal.actor()).await {
        Ok(item) => Json(ItemView::from(item)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_movements(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let store = services.store();
    if let Err(e) = store.get_item(id).await {
        return errors::store_error_to_response(e);
    }
    match store.movements_for_item(id).await {
        Ok(movements) => Json(movements).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_stats(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store().list_items().await {
        Ok(items) => Json(inventory_stats(&items)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
