use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;
use mg_core::{Error, GenerationJob, GenerationRequest, MediaArtifact, ProdiaModel, Result};
use crate::config::{AppConfig, PollConfig};
use crate::generator::poll::{poll_until_terminal, PollState};
use crate::generator::provider::{bearer, ensure_success, ProviderClient};

const SERVICE: &str = "prodia";
const DEFAULT_NEGATIVE_PROMPT: &str = "blurry, bad quality, distorted";

#[derive(Debug, Serialize)]
struct ProdiaGenerateRequest<'a> {
    prompt: &'a str,
    model: &'a str,
    steps: u32,
    cfg_scale: u32,
    negative_prompt: &'a str,
    aspect_ratio: &'a str,
}

#[derive(Debug, Deserialize)]
struct ProdiaJob {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ProdiaStatus {
    status: String,
    image: Option<ProdiaImage>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProdiaImage {
    url: String,
}

/// Prodia hosted Stable Diffusion: submit a job, then poll it
pub struct ProdiaClient {
    client: Client,
    base_url: String,
    api_key: String,
    poll: PollConfig,
}

impl ProdiaClient {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            base_url: config.prodia_base_url.trim_end_matches('/').to_string(),
            api_key: config.prodia_api_key.clone(),
            poll: config.poll.clone(),
        }
    }

    async fn submit(&self, request: &GenerationRequest) -> Result<String> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(ProdiaModel::default().id());

        let body = ProdiaGenerateRequest {
            prompt: &request.prompt,
            model,
            steps: request.params.steps,
            cfg_scale: 7,
            negative_prompt: request.negative_prompt().unwrap_or(DEFAULT_NEGATIVE_PROMPT),
            aspect_ratio: "square",
        };

        let response = self
            .client
            .post(format!("{}/generate", self.base_url))
            .header("Authorization", bearer(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let job: ProdiaJob = ensure_success(SERVICE, response).await?.json().await?;
        info!(job_id = %job.id, model, "Submitted Prodia job");
        Ok(job.id)
    }

    async fn check(&self, job_id: &str) -> Result<PollState<String>> {
        let response = self
            .client
            .get(format!("{}/generation/{}", self.base_url, job_id))
            .header("Authorization", bearer(&self.api_key))
            .send()
            .await?;

        let status: ProdiaStatus = ensure_success(SERVICE, response).await?.json().await?;
        match status.status.as_str() {
            "succeeded" => status
                .image
                .map(|image| PollState::Succeeded(image.url))
                .ok_or_else(|| Error::parse("Prodia job succeeded without an image url")),
            "failed" => Ok(PollState::Failed(
                status.error.unwrap_or_else(|| "Image generation failed".to_string()),
            )),
            _ => Ok(PollState::Pending),
        }
    }
}

#[async_trait]
impl ProviderClient for ProdiaClient {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<MediaArtifact> {
        let job_id = self.submit(request).await?;
        let job = GenerationJob::submitted(job_id.clone());

        let url = poll_until_terminal(SERVICE, &self.poll, job, || self.check(&job_id)).await?;
        info!(job_id = %job_id, "Prodia image ready");
        Ok(MediaArtifact::Url(url))
    }
}
