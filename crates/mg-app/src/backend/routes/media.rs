use std::sync::Arc;
use axum::extract::State;
use axum::Json;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;
use mg_core::MediaKind;
use crate::backend::schemas::{MediaRequest, MediaResponse};
use crate::backend::state::AppState;
use crate::error::AppError;

pub async fn create_image(
    State(state): State<Arc<AppState>>,
    Json(form): Json<MediaRequest>,
) -> Result<Json<MediaResponse>, AppError> {
    generate(&state, MediaKind::Image, form).await
}

pub async fn create_video(
    State(state): State<Arc<AppState>>,
    Json(form): Json<MediaRequest>,
) -> Result<Json<MediaResponse>, AppError> {
    generate(&state, MediaKind::Video, form).await
}

async fn generate(
    state: &AppState,
    kind: MediaKind,
    form: MediaRequest,
) -> Result<Json<MediaResponse>, AppError> {
    let service = form.service;
    if !service.supports(kind) {
        return Err(AppError::BadRequest(format!(
            "{} cannot generate {} output",
            service.name(),
            format!("{kind:?}").to_lowercase()
        )));
    }

    let request = form.into_generation_request()?;
    let span = info_span!("generate", request_id = %Uuid::new_v4(), service = service.id());

    async move {
        let artifact = state.generator.generate(service, &request).await?;
        info!(mime = artifact.mime().unwrap_or("url"), "Media ready");
        Ok::<_, AppError>(Json(MediaResponse::try_from(artifact)?))
    }
    .instrument(span)
    .await
}
