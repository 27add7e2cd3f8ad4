use async_trait::async_trait;
use reqwest::Response;
use mg_core::{Error, GenerationRequest, MediaArtifact, Result};

/// A backend that turns a prompt into media
#[async_trait]
pub trait ProviderClient: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> Result<MediaArtifact>;
}

/// Turn a non-2xx response into `Error::Status`, keeping the body for the log
pub async fn ensure_success(service: &str, response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(Error::Status {
        service: service.to_string(),
        status,
        body,
    })
}

pub fn bearer(api_key: &str) -> String {
    format!("Bearer {}", api_key)
}
