//! Review queue: flagged imports waiting for a human decision.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use npi_inventory::ReviewAction;

use crate::app::dto::{self, ItemView, ReviewPatchRequest};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn review_queue(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store().review_queue().await {
        Ok(items) => Json(items).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// `complete` applies `updates` (absent means no changes) and clears the
/// flag; `skip` only clears it; `archive` clears it and deactivates the item.
pub async fn review_action(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<ReviewPatchRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match errors::json_body(body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    let (Some(raw_id), Some(raw_action)) = (
        body.item_id.filter(|s| !s.trim().is_empty()),
        body.action.filter(|s| !s.trim().is_empty()),
    ) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", "Missing itemId or action");
    };
    let action: ReviewAction = match raw_action.parse() {
        Ok(action) => action,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_action", "Invalid action"),
    };
    let id = match dto::parse_item_id(&raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let store = services.store();
    let actor = principal.actor();
    let result = match action {
        ReviewAction::Complete => {
            let updates = body.updates.unwrap_or_default();
            if let Err(e) = updates.validate() {
                return errors::domain_error_to_response(e);
            }
            store.complete_review(id, updates, actor).await
        }
        ReviewAction::Skip => store.skip_review(id, false, actor).await,
        ReviewAction::Archive => store.skip_review(id, true, actor).await,
    };

    match result {
        Ok(item) => {
            tracing::info!(item_id = %id, action = action.as_str(), "review resolved");
            Json(ItemView::from(item)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
