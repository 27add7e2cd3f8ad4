use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{info, warn};
use mg_core::{Error, GenerationRequest, MediaArtifact, PollinationsModel, Result};
use crate::config::AppConfig;
use crate::generator::provider::{ensure_success, ProviderClient};

const SERVICE: &str = "pollinations";

/// Pollinations.ai serves images straight from a prompt URL
pub struct PollinationsClient {
    client: Client,
    base_url: String,
}

impl PollinationsClient {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            base_url: config.pollinations_base_url.clone(),
        }
    }

    pub fn image_url(&self, prompt: &str, model: &str) -> Result<String> {
        build_image_url(&self.base_url, prompt, model)
    }
}

/// `{base}/{prompt}?model={model}` with the prompt as one encoded path segment
pub fn build_image_url(base_url: &str, prompt: &str, model: &str) -> Result<String> {
    let mut url = Url::parse(base_url)
        .map_err(|e| Error::parse(format!("invalid Pollinations base url {base_url}: {e}")))?;

    url.path_segments_mut()
        .map_err(|_| Error::parse(format!("Pollinations base url {base_url} cannot take a path")))?
        .pop_if_empty()
        .push(prompt);
    url.query_pairs_mut().append_pair("model", model);

    Ok(url.to_string())
}

#[async_trait]
impl ProviderClient for PollinationsClient {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<MediaArtifact> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(PollinationsModel::default().id());
        let image_url = self.image_url(&request.prompt, model)?;

        let response = self.client.head(&image_url).send().await.map_err(|e| {
            warn!(url = %image_url, "Pollinations image is unreachable: {}", e);
            Error::from(e)
        })?;
        ensure_success(SERVICE, response).await?;

        info!(model, "Pollinations image ready");
        Ok(MediaArtifact::Url(image_url))
    }
}
