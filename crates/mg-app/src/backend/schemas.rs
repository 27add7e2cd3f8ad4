use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use mg_core::{
    DocumentStructure, Error, GenerationParams, GenerationRequest, MediaArtifact, PollinationsModel,
    ProdiaModel, Service, VideoSettings,
};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaRequest {
    pub service: Service,
    pub prompt: String,
    #[serde(default)]
    pub negative_prompt: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub params: GenerationParams,
    #[serde(default)]
    pub random_seed: bool,
}

impl MediaRequest {
    /// Validate the form and build the provider request. A random seed,
    /// when asked for, replaces any seed in `params`.
    pub fn into_generation_request(self) -> Result<GenerationRequest, AppError> {
        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            return Err(AppError::BadRequest("Please enter a prompt!".to_string()));
        }

        let mut params = self.params;
        if self.random_seed {
            params.seed = Some(rand::random::<u32>());
        }

        let mut request = GenerationRequest::new(prompt).with_params(params);
        if let Some(negative_prompt) = self.negative_prompt {
            request = request.with_negative_prompt(negative_prompt);
        }
        if let Some(model) = self.model.filter(|m| !m.trim().is_empty()) {
            request = request.with_model(catalog_model(self.service, model.trim())?);
        }
        Ok(request)
    }
}

/// Resolve a model id against the catalog of the chosen service
fn catalog_model(service: Service, id: &str) -> Result<&'static str, AppError> {
    let model = match service {
        Service::Prodia => ProdiaModel::from_id(id).map(|m| m.id()),
        Service::Pollinations => PollinationsModel::from_id(id).map(|m| m.id()),
        _ => {
            return Err(AppError::BadRequest(format!(
                "{} does not take a model",
                service.name()
            )));
        }
    };
    model.ok_or_else(|| AppError::BadRequest(format!("Unknown {} model '{}'", service.name(), id)))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaResponse {
    Url {
        url: String,
    },
    Inline {
        mime: String,
        file_name: String,
        data: String,
    },
}

impl TryFrom<MediaArtifact> for MediaResponse {
    type Error = AppError;

    fn try_from(artifact: MediaArtifact) -> Result<Self, Self::Error> {
        match artifact {
            MediaArtifact::Url(url) => Ok(Self::Url { url }),
            MediaArtifact::Inline { bytes, mime, file_name } => Ok(Self::Inline {
                mime,
                file_name,
                data: STANDARD.encode(bytes),
            }),
            MediaArtifact::TempFile { path, .. } => Err(AppError::from(Error::pipeline(format!(
                "temp file {} was not read back",
                path.display()
            )))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentRequest {
    pub topic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentResponse {
    pub structure: DocumentStructure,
    pub file_name: String,
    pub mime: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ServiceInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub image: bool,
    pub video: bool,
    pub local: bool,
}

impl From<Service> for ServiceInfo {
    fn from(service: Service) -> Self {
        Self {
            id: service.id(),
            name: service.name(),
            description: service.description(),
            icon: service.icon(),
            image: service.supports(mg_core::MediaKind::Image),
            video: service.supports(mg_core::MediaKind::Video),
            local: service.is_local(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CatalogResponse {
    pub services: Vec<ServiceInfo>,
    pub prodia_models: Vec<ModelInfo>,
    pub pollinations_models: Vec<ModelInfo>,
    pub video: VideoSettings,
    pub defaults: GenerationParams,
}

impl CatalogResponse {
    pub fn new(video: VideoSettings) -> Self {
        let defaults = GenerationParams {
            cfg_scale: video.default_cfg_scale(),
            motion_bucket_id: video.default_motion_bucket(),
            video_frames: video.default_frames(),
            ..Default::default()
        };
        Self {
            services: Service::all().into_iter().map(ServiceInfo::from).collect(),
            prodia_models: ProdiaModel::all()
                .into_iter()
                .map(|m| ModelInfo { id: m.id(), name: m.name() })
                .collect(),
            pollinations_models: PollinationsModel::all()
                .into_iter()
                .map(|m| ModelInfo { id: m.id(), name: m.name() })
                .collect(),
            video,
            defaults,
        }
    }
}
