use std::sync::Arc;
use axum::Router;
use axum::routing::{get, post};
use crate::backend::routes::catalog::get_catalog;
use crate::backend::routes::document::create_document;
use crate::backend::routes::media::{create_image, create_video};
use crate::backend::state::AppState;

mod catalog;
mod document;
mod media;

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/catalog", get(get_catalog))
        .route("/api/image", post(create_image))
        .route("/api/video", post(create_video))
        .route("/api/document", post(create_document))
}
