// crates/mg-local/src/service.rs

use std::time::Duration;
use image::RgbaImage;
use log::{info, warn};
use mg_core::{Error, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use crate::encode::decode_base64_image;
use crate::pipeline::{DiffusionPipeline, PipelineCall, PipelineLoader};

#[derive(Serialize)]
struct LoadRequest<'a> {
    model: &'a str,
}

#[derive(Deserialize)]
struct LoadResponse {
    handle: String,
}

#[derive(Serialize)]
struct DeviceRequest<'a> {
    device: &'a str,
    empty_cache: bool,
}

#[derive(Deserialize)]
struct RunResponse {
    status: String,
    #[serde(default)]
    images: Vec<String>,
    error: Option<String>,
}

/// Loads pipelines into the local inference service
/// (`LOCAL_PIPELINE_URL`, `http://127.0.0.1:5000` by default).
///
/// The blocking client is built on the first `load`, which always runs on
/// a blocking thread, never on the async runtime.
pub struct ServiceLoader {
    base_url: String,
    timeout: Duration,
}

impl ServiceLoader {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

impl PipelineLoader for ServiceLoader {
    fn load(&self, model_id: &str) -> Result<Box<dyn DiffusionPipeline>> {
        let client = Client::builder().timeout(self.timeout).build()?;
        let url = format!("{}/pipelines", self.base_url);
        let response = client
            .post(&url)
            .json(&LoadRequest { model: model_id })
            .send()
            .map_err(|e| Error::pipeline(format!(
                "Failed to connect to pipeline service at {}: {}. Make sure the local inference service is running",
                self.base_url, e
            )))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::pipeline(format!("Service returned {}: {}", status, body)));
        }

        let loaded: LoadResponse = response
            .json()
            .map_err(|e| Error::parse(format!("Failed to parse load response: {}", e)))?;
        info!("Loaded {} as pipeline {}", model_id, loaded.handle);

        Ok(Box::new(ServicePipeline {
            base_url: self.base_url.clone(),
            client,
            model_id: model_id.to_string(),
            handle: loaded.handle,
        }))
    }
}

/// A pipeline resident in the local inference service
struct ServicePipeline {
    base_url: String,
    client: Client,
    model_id: String,
    handle: String,
}

impl ServicePipeline {
    fn move_to(&self, device: &str, empty_cache: bool) -> Result<()> {
        let url = format!("{}/pipelines/{}/device", self.base_url, self.handle);
        let response = self
            .client
            .post(url)
            .json(&DeviceRequest { device, empty_cache })
            .send()
            .map_err(|e| Error::pipeline(format!("Failed to move pipeline to {}: {}", device, e)))?;

        if !response.status().is_success() {
            return Err(Error::pipeline(format!(
                "Moving {} to {} failed with {}",
                self.model_id,
                device,
                response.status()
            )));
        }
        Ok(())
    }
}

impl DiffusionPipeline for ServicePipeline {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn acquire(&mut self) -> Result<()> {
        self.move_to("cuda", false)
    }

    fn run(&mut self, call: &PipelineCall) -> Result<Vec<RgbaImage>> {
        let url = format!("{}/pipelines/{}/run", self.base_url, self.handle);
        let response = self
            .client
            .post(url)
            .json(call)
            .send()
            .map_err(|e| Error::pipeline(format!("Inference request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::pipeline(format!("Service returned {}: {}", status, body)));
        }

        let result: RunResponse = response
            .json()
            .map_err(|e| Error::parse(format!("Failed to parse run response: {}", e)))?;

        match result.status.as_str() {
            "success" => result
                .images
                .iter()
                .map(|payload| decode_base64_image(payload))
                .collect(),
            "error" => {
                let error_msg = result.error.unwrap_or_else(|| "Unknown error".to_string());
                Err(Error::pipeline(format!("Service error: {}", error_msg)))
            }
            other => Err(Error::parse(format!("Unexpected status: {}", other))),
        }
    }

    fn release(&mut self) {
        if let Err(e) = self.move_to("cpu", true) {
            warn!("Failed to release {}: {}", self.model_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use axum::extract::{Path, State};
    use axum::routing::post;
    use axum::{Json, Router};
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use mg_core::GenerationRequest;
    use serde_json::{json, Value};
    use crate::encode::encode_png;
    use crate::pipeline::LocalPipeline;

    #[derive(Clone)]
    struct MockService {
        calls: Arc<Mutex<Vec<String>>>,
        fail_run: bool,
    }

    async fn load(State(s): State<MockService>, Json(body): Json<Value>) -> Json<Value> {
        s.calls.lock().unwrap().push(format!("load {}", body["model"].as_str().unwrap_or("")));
        Json(json!({ "handle": "p1" }))
    }

    async fn device(
        State(s): State<MockService>,
        Path(handle): Path<String>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        s.calls.lock().unwrap().push(format!(
            "{} -> {}",
            handle,
            body["device"].as_str().unwrap_or("")
        ));
        Json(json!({ "device": body["device"] }))
    }

    async fn run(
        State(s): State<MockService>,
        Path(handle): Path<String>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        s.calls.lock().unwrap().push(format!("{} run {}", handle, body["prompt"].as_str().unwrap_or("")));
        if s.fail_run {
            return Json(json!({ "status": "error", "error": "CUDA out of memory" }));
        }
        let png = encode_png(&RgbaImage::new(2, 2)).unwrap();
        Json(json!({ "status": "success", "images": [STANDARD.encode(png)] }))
    }

    /// Serve the mock on a background runtime so the blocking client can
    /// call it from the test thread.
    fn spawn_service(fail_run: bool) -> (tokio::runtime::Runtime, String, Arc<Mutex<Vec<String>>>) {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = MockService { calls: calls.clone(), fail_run };
        let app = Router::new()
            .route("/pipelines", post(load))
            .route("/pipelines/{handle}/device", post(device))
            .route("/pipelines/{handle}/run", post(run))
            .with_state(state);

        let listener = rt
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .unwrap();
        let addr = listener.local_addr().unwrap();
        rt.spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        (rt, format!("http://{}", addr), calls)
    }

    #[test]
    fn test_service_pipeline_lifecycle() {
        let (_rt, base_url, calls) = spawn_service(false);
        let loader = ServiceLoader::new(base_url, Duration::from_secs(5));
        let mut pipeline = LocalPipeline::new("black-forest-labs/FLUX.1-dev", Box::new(loader));

        let images = pipeline
            .run_once(&PipelineCall::image(&GenerationRequest::new("a red barn")))
            .unwrap();

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].width(), 2);
        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                "load black-forest-labs/FLUX.1-dev",
                "p1 -> cuda",
                "p1 run a red barn",
                "p1 -> cpu",
            ]
        );
    }

    #[test]
    fn test_service_error_releases_pipeline() {
        let (_rt, base_url, calls) = spawn_service(true);
        let loader = ServiceLoader::new(base_url, Duration::from_secs(5));
        let mut pipeline = LocalPipeline::new("genmo/mochi-1-preview", Box::new(loader));

        let err = pipeline
            .run_once(&PipelineCall::video(&GenerationRequest::new("a butterfly")))
            .unwrap_err();

        assert!(err.to_string().contains("CUDA out of memory"));
        assert_eq!(calls.lock().unwrap().last().map(String::as_str), Some("p1 -> cpu"));
    }

    #[test]
    fn test_unreachable_service() {
        let loader = ServiceLoader::new("http://127.0.0.1:1", Duration::from_secs(2));
        let err = loader.load("black-forest-labs/FLUX.1-dev").err().unwrap();
        assert_eq!(err.kind(), mg_core::ErrorKind::Resource);
    }
}
