use std::path::PathBuf;
use chrono::Utc;
use reqwest::Client;
use tracing::{info, warn};
use mg_core::{
    DocumentContents, DocumentStructure, Error, GenerationRequest, MediaArtifact, Result, Service,
};
use mg_local::{FluxGenerator, MochiGenerator, ServiceLoader};
use crate::cleanup::remove_temp_file;
use crate::config::AppConfig;
use crate::content::ContentClient;
use crate::document;
use crate::generator::local::{AcceleratorLock, FluxProvider, MochiProvider};
use crate::generator::pollinations::PollinationsClient;
use crate::generator::prodia::ProdiaClient;
use crate::generator::provider::ProviderClient;
use crate::generator::stability::StabilityClient;

pub mod local;
pub mod poll;
pub mod pollinations;
pub mod prodia;
pub mod provider;
pub mod stability;

/// A finished PDF, kept on disk and returned to the caller
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub structure: DocumentStructure,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl GeneratedDocument {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Every provider client plus the content and document pair, built once
/// from the startup configuration.
pub struct Generator {
    flux: FluxProvider,
    mochi: MochiProvider,
    prodia: ProdiaClient,
    pollinations: PollinationsClient,
    stability: StabilityClient,
    content: ContentClient,
    pdf_dir: PathBuf,
    pdf_file_name: String,
}

impl Generator {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.http_timeout).build()?;

        let flux_loader = ServiceLoader::new(&config.local_pipeline_url, config.pipeline_timeout);
        let mochi_loader = ServiceLoader::new(&config.local_pipeline_url, config.pipeline_timeout);
        let accelerator = AcceleratorLock::default();

        Ok(Self {
            flux: FluxProvider::new(FluxGenerator::new(Box::new(flux_loader)), accelerator.clone()),
            mochi: MochiProvider::new(MochiGenerator::new(Box::new(mochi_loader)), accelerator),
            prodia: ProdiaClient::new(client.clone(), config),
            pollinations: PollinationsClient::new(client.clone(), config),
            stability: StabilityClient::new(client.clone(), config),
            content: ContentClient::new(client, config),
            pdf_dir: config.pdf_dir(),
            pdf_file_name: config.pdf.default_filename.clone(),
        })
    }

    pub fn provider(&self, service: Service) -> &dyn ProviderClient {
        match service {
            Service::Flux => &self.flux,
            Service::Mochi => &self.mochi,
            Service::Prodia => &self.prodia,
            Service::Pollinations => &self.pollinations,
            Service::Stability => &self.stability,
        }
    }

    /// Run one provider. Temp files are read back into memory and deleted so
    /// nothing outlives the request.
    pub async fn generate(&self, service: Service, request: &GenerationRequest) -> Result<MediaArtifact> {
        let provider = self.provider(service);
        info!(service = provider.name(), prompt = %request.prompt, "Generating media");

        let artifact = provider.generate(request).await?;
        materialize(artifact).await
    }

    /// Outline the topic, write each section, then lay the PDF out under the
    /// document directory as `<unix-secs>_<default file name>`.
    pub async fn generate_document(&self, topic: &str) -> Result<GeneratedDocument> {
        let structure = self.content.structure(topic).await?;
        if structure.sections.is_empty() {
            return Err(Error::parse("document structure has no sections"));
        }

        let mut contents = DocumentContents::new();
        let mut last_error = None;
        for section in &structure.sections {
            match self
                .content
                .section_content(&section.heading, &section.subheadings)
                .await
            {
                Ok(content) => {
                    contents.insert(section.heading.clone(), content);
                }
                Err(e) => {
                    warn!(heading = %section.heading, "Section rendered without content: {}", e);
                    last_error = Some(e);
                }
            }
        }

        if contents.is_empty() {
            return Err(last_error.unwrap_or_else(|| Error::parse("no section produced content")));
        }

        let path = self
            .pdf_dir
            .join(format!("{}_{}", Utc::now().timestamp(), self.pdf_file_name));
        let path = document::assemble(&structure.title, &structure.sections, &contents, &path).await?;
        let bytes = tokio::fs::read(&path).await?;

        Ok(GeneratedDocument {
            structure,
            path,
            bytes,
        })
    }
}

async fn materialize(artifact: MediaArtifact) -> Result<MediaArtifact> {
    match artifact {
        MediaArtifact::TempFile { path, mime, file_name } => {
            let bytes = tokio::fs::read(&path).await;
            remove_temp_file(&path);
            Ok(MediaArtifact::Inline {
                bytes: bytes?,
                mime,
                file_name,
            })
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use mg_core::ErrorKind;
    use crate::testing::{test_config, MockServer};

    /// Outline with two sections; prose requests about `Outlook` fail
    async fn chat(Json(body): Json<Value>) -> std::result::Result<Json<Value>, StatusCode> {
        let content = if body.get("response_format").is_some() {
            json!({
                "title": "Solar Energy",
                "sections": [
                    {"heading": "History", "subheadings": ["Early Research", "Modern Breakthroughs"]},
                    {"heading": "Outlook", "subheadings": []}
                ]
            })
            .to_string()
        } else {
            let prompt = body["messages"][1]["content"].as_str().unwrap_or_default();
            if prompt.contains("\"Outlook\"") {
                return Err(StatusCode::SERVICE_UNAVAILABLE);
            }
            format!("Text for {}.", prompt.split('"').nth(1).unwrap_or_default())
        };
        Ok(Json(json!({ "choices": [{ "message": { "content": content } }] })))
    }

    fn generator(server: &MockServer, pdf_dir: &std::path::Path) -> Generator {
        let mut config = test_config(&server.base_url);
        config.pdf.temp_directory = pdf_dir.to_string_lossy().into_owned();
        Generator::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_solar_energy_document() {
        let server = MockServer::start(Router::new().route("/chat/completions", post(chat))).await;
        let dir = tempfile::tempdir().unwrap();
        let generator = generator(&server, dir.path());

        let document = generator.generate_document("Solar Energy").await.unwrap();

        assert_eq!(document.structure.title, "Solar Energy");
        assert!(document.bytes.starts_with(b"%PDF-"));
        assert!(document.path.starts_with(dir.path()));
        assert!(document.file_name().ends_with("_generated_document.pdf"));

        let text = String::from_utf8_lossy(&document.bytes);
        let order = [
            "(Solar Energy)",
            "(History)",
            "(Text for History.)",
            "(Early Research)",
            "(Text for Early Research.)",
            "(Modern Breakthroughs)",
            "(Text for Modern Breakthroughs.)",
            "(Outlook)",
        ];
        let positions: Vec<usize> = order.iter().map(|s| text.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_document_fails_when_no_section_has_content() {
        let app = Router::new().route(
            "/chat/completions",
            post(|Json(body): Json<Value>| async move {
                if body.get("response_format").is_some() {
                    let outline = json!({"title": "Outlook", "sections": [{"heading": "Outlook"}]});
                    Ok(Json(json!({ "choices": [{ "message": { "content": outline.to_string() } }] })))
                } else {
                    Err(StatusCode::SERVICE_UNAVAILABLE)
                }
            }),
        );
        let server = MockServer::start(app).await;
        let dir = tempfile::tempdir().unwrap();
        let generator = generator(&server, dir.path());

        let err = generator.generate_document("Outlook").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_temp_file_is_read_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("temp_video_1.mp4");
        std::fs::write(&path, b"mp4 bytes").unwrap();

        let artifact = materialize(MediaArtifact::TempFile {
            path: path.clone(),
            mime: "video/mp4".into(),
            file_name: "stability_generated_video.mp4".into(),
        })
        .await
        .unwrap();

        assert_eq!(
            artifact,
            MediaArtifact::inline(b"mp4 bytes".to_vec(), "video/mp4", "stability_generated_video.mp4")
        );
        assert!(!path.exists());
    }
}
