//! Reference data: categories, sub-categories, locations.

use std::sync::Arc;

use axum::{Json, extract::Extension, response::IntoResponse};

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn categories(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store().categories().await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn sub_categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store().sub_categories().await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn locations(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store().locations().await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
