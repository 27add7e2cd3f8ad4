use std::sync::Arc;
use axum::extract::State;
use axum::Json;
use crate::backend::schemas::CatalogResponse;
use crate::backend::state::AppState;

pub async fn get_catalog(State(state): State<Arc<AppState>>) -> Json<CatalogResponse> {
    Json(CatalogResponse::new(state.video.clone()))
}
