use std::path::{Path, PathBuf};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;
use mg_core::{Error, GenerationJob, GenerationRequest, MediaArtifact, Result};
use crate::config::{AppConfig, PollConfig};
use crate::generator::poll::{poll_until_terminal, PollState};
use crate::generator::provider::{bearer, ensure_success, ProviderClient};

const SERVICE: &str = "stability";
pub const VIDEO_MIME: &str = "video/mp4";
pub const VIDEO_FILE_NAME: &str = "stability_generated_video.mp4";

#[derive(Debug, Deserialize)]
struct Engine {
    id: String,
}

#[derive(Debug, Serialize)]
struct TextPrompt<'a> {
    text: &'a str,
    weight: f32,
}

#[derive(Debug, Serialize)]
struct TextToVideoRequest<'a> {
    text_prompts: Vec<TextPrompt<'a>>,
    seed: u32,
    cfg_scale: f32,
    motion_bucket_id: u32,
    number_of_frames: u32,
}

#[derive(Debug, Deserialize)]
struct TextToVideoResponse {
    id: Option<String>,
    status: Option<String>,
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Artifact {
    base64: String,
    finish_reason: Option<String>,
}

/// Stability AI text-to-video
pub struct StabilityClient {
    client: Client,
    base_url: String,
    api_key: String,
    poll: PollConfig,
    temp_dir: PathBuf,
}

impl StabilityClient {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            base_url: config.stability_base_url.trim_end_matches('/').to_string(),
            api_key: config.stability_api_key.clone(),
            poll: config.poll.clone(),
            temp_dir: config.media_temp_dir.clone(),
        }
    }

    async fn video_engine(&self) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/engines/list", self.base_url))
            .header("Authorization", bearer(&self.api_key))
            .header("Accept", "application/json")
            .send()
            .await?;

        let engines: Vec<Engine> = ensure_success(SERVICE, response).await?.json().await?;
        engines
            .into_iter()
            .map(|engine| engine.id)
            .find(|id| id.to_lowercase().contains("video"))
            .ok_or_else(|| Error::parse("No video generation engine found"))
    }

    async fn submit(&self, engine: &str, request: &GenerationRequest) -> Result<TextToVideoResponse> {
        let params = &request.params;
        let body = TextToVideoRequest {
            text_prompts: vec![TextPrompt {
                text: &request.prompt,
                weight: 1.0,
            }],
            seed: params.seed.unwrap_or(0),
            cfg_scale: params.cfg_scale,
            motion_bucket_id: params.motion_bucket_id,
            number_of_frames: params.video_frames,
        };

        let response = self
            .client
            .post(format!("{}/generation/{}/text-to-video", self.base_url, engine))
            .header("Authorization", bearer(&self.api_key))
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        Ok(ensure_success(SERVICE, response).await?.json().await?)
    }

    async fn check(&self, engine: &str, job_id: &str) -> Result<PollState<Artifact>> {
        let response = self
            .client
            .get(format!(
                "{}/generation/{}/text-to-video/result/{}",
                self.base_url, engine, job_id
            ))
            .header("Authorization", bearer(&self.api_key))
            .header("Accept", "application/json")
            .send()
            .await?;

        let result: TextToVideoResponse = ensure_success(SERVICE, response).await?.json().await?;
        if result.status.as_deref() == Some("failed") {
            return Ok(PollState::Failed("Video generation failed".to_string()));
        }
        Ok(match result.artifacts.into_iter().next().map(finished) {
            Some(Ok(artifact)) => PollState::Succeeded(artifact),
            Some(Err(reason)) => PollState::Failed(reason),
            None => PollState::Pending,
        })
    }
}

fn finished(artifact: Artifact) -> std::result::Result<Artifact, String> {
    match artifact.finish_reason.as_deref() {
        Some("ERROR") => Err("artifact finished with ERROR".to_string()),
        Some("CONTENT_FILTERED") => Err("artifact was content filtered".to_string()),
        _ => Ok(artifact),
    }
}

/// Decode the video and write it to `temp_video_<millis>.mp4` under `dir`
async fn persist_video(dir: &Path, artifact: &Artifact) -> Result<PathBuf> {
    let video = STANDARD.decode(artifact.base64.trim())?;
    if video.is_empty() {
        return Err(Error::parse("Stability returned an empty video"));
    }
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!("temp_video_{}.mp4", Utc::now().timestamp_millis()));
    tokio::fs::write(&path, video).await?;
    Ok(path)
}

#[async_trait]
impl ProviderClient for StabilityClient {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<MediaArtifact> {
        let engine = self.video_engine().await?;
        info!(engine = %engine, frames = request.params.video_frames, "Submitting Stability video");

        let submitted = self.submit(&engine, request).await?;
        let artifact = match (submitted.artifacts.into_iter().next(), submitted.id) {
            (Some(artifact), id) => finished(artifact).map_err(|reason| Error::JobFailed {
                service: SERVICE.to_string(),
                job_id: id.unwrap_or(engine),
                reason,
            })?,
            (None, Some(job_id)) => {
                let job = GenerationJob::submitted(job_id.clone());
                poll_until_terminal(SERVICE, &self.poll, job, || self.check(&engine, &job_id)).await?
            }
            (None, None) => return Err(Error::parse("Stability response had neither artifacts nor a job id")),
        };

        let path = persist_video(&self.temp_dir, &artifact).await?;
        info!(path = %path.display(), "Stability video saved");
        Ok(MediaArtifact::TempFile {
            path,
            mime: VIDEO_MIME.to_string(),
            file_name: VIDEO_FILE_NAME.to_string(),
        })
    }
}
