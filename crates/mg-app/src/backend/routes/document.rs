use std::sync::Arc;
use axum::extract::State;
use axum::Json;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;
use crate::backend::schemas::{DocumentRequest, DocumentResponse};
use crate::backend::state::AppState;
use crate::document::PDF_MIME;
use crate::error::AppError;

pub async fn create_document(
    State(state): State<Arc<AppState>>,
    Json(form): Json<DocumentRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    let topic = form.topic.trim();
    if topic.is_empty() {
        return Err(AppError::BadRequest("Please enter a topic!".to_string()));
    }

    let span = info_span!("document", request_id = %Uuid::new_v4());
    async move {
        let document = state.generator.generate_document(topic).await?;
        info!(path = %document.path.display(), "Document ready");

        Ok::<_, AppError>(Json(DocumentResponse {
            file_name: document.file_name(),
            mime: PDF_MIME.to_string(),
            data: STANDARD.encode(&document.bytes),
            structure: document.structure,
        }))
    }
    .instrument(span)
    .await
}
