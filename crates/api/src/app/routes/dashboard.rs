use std::sync::Arc;

use axum::{Json, extract::Extension, response::IntoResponse};

use npi_infra::StoreError;
use npi_inventory::dashboard_stats;

use crate::app::dto::DashboardView;
use crate::app::errors;
use crate::app::services::AppServices;

const RECENT_MOVEMENTS: usize = 10;

pub async fn dashboard(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let store = services.store();
    let view = async {
        let items = store.list_items().await?;
        Ok::<_, StoreError>(DashboardView {
            stats: dashboard_stats(&items),
            pending_review: items.iter().filter(|i| i.needs_review).count(),
            recent_movements: store.recent_movements(RECENT_MOVEMENTS).await?,
        })
    };

    match view.await {
        Ok(view) => Json(view).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
