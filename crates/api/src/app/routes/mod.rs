use axum::{Router, routing::get};

pub mod dashboard;
pub mod inventory;
pub mod reference;
pub mod review;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/stream", get(system::stream))
        .route("/categories", get(reference::categories))
        .route("/sub-categories", get(reference::sub_categories))
        .route("/locations", get(reference::locations))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/review", get(review::review_queue).patch(review::review_action))
        .nest("/inventory", inventory::router())
}
