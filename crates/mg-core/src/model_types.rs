use serde::{Deserialize, Serialize};

/// Generation backends selectable from the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Flux,
    Mochi,
    Prodia,
    Pollinations,
    Stability,
}

impl Service {
    /// Service name for display in UI
    pub fn name(&self) -> &'static str {
        match self {
            Self::Flux => "FLUX",
            Self::Mochi => "Mochi",
            Self::Prodia => "Prodia",
            Self::Pollinations => "Pollinations.ai",
            Self::Stability => "Stability AI",
        }
    }

    /// Service ID for API communication
    pub fn id(&self) -> &'static str {
        match self {
            Self::Flux => "flux",
            Self::Mochi => "mochi",
            Self::Prodia => "prodia",
            Self::Pollinations => "pollinations",
            Self::Stability => "stability",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Flux => "FLUX.1-dev on the local diffusion pipeline",
            Self::Mochi => "Mochi 1 preview on the local diffusion pipeline",
            Self::Prodia => "Prodia hosted Stable Diffusion models",
            Self::Pollinations => "Pollinations.ai direct image URLs",
            Self::Stability => "Stability AI text-to-video",
        }
    }

    /// UI icon
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Flux => "⚡",
            Self::Mochi => "🎞",
            Self::Prodia => "🖼",
            Self::Pollinations => "🌸",
            Self::Stability => "🎬",
        }
    }

    /// Whether the service runs on the local accelerator
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Flux | Self::Mochi)
    }

    /// Media the service can produce
    pub fn supports(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Image => matches!(
                self,
                Self::Flux | Self::Mochi | Self::Prodia | Self::Pollinations
            ),
            MediaKind::Video => matches!(self, Self::Mochi | Self::Stability),
        }
    }

    /// All available services
    pub fn all() -> [Service; 5] {
        [
            Self::Flux,
            Self::Mochi,
            Self::Prodia,
            Self::Pollinations,
            Self::Stability,
        ]
    }

    pub fn for_kind(kind: MediaKind) -> Vec<Service> {
        Self::all().into_iter().filter(|s| s.supports(kind)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProdiaModel {
    #[default]
    #[serde(rename = "sdxl")]
    Sdxl,
    #[serde(rename = "stable-diffusion-xl")]
    StableDiffusionXl,
    #[serde(rename = "deliberate-v2")]
    DeliberateV2,
    #[serde(rename = "dreamshaper-8")]
    DreamShaper8,
    #[serde(rename = "realistic-vision-v5.1")]
    RealisticVisionV51,
}

impl ProdiaModel {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sdxl => "SDXL",
            Self::StableDiffusionXl => "Stable Diffusion XL",
            Self::DeliberateV2 => "Deliberate V2",
            Self::DreamShaper8 => "DreamShaper 8",
            Self::RealisticVisionV51 => "Realistic Vision V5.1",
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Sdxl => "sdxl",
            Self::StableDiffusionXl => "stable-diffusion-xl",
            Self::DeliberateV2 => "deliberate-v2",
            Self::DreamShaper8 => "dreamshaper-8",
            Self::RealisticVisionV51 => "realistic-vision-v5.1",
        }
    }

    pub fn all() -> [ProdiaModel; 5] {
        [
            Self::Sdxl,
            Self::StableDiffusionXl,
            Self::DeliberateV2,
            Self::DreamShaper8,
            Self::RealisticVisionV51,
        ]
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::all().into_iter().find(|m| m.id() == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PollinationsModel {
    #[default]
    #[serde(rename = "stable-diffusion-xl")]
    StableDiffusionXl,
    #[serde(rename = "kandinsky")]
    Kandinsky,
    #[serde(rename = "openjourney")]
    OpenJourney,
    #[serde(rename = "stable-diffusion-2.1")]
    StableDiffusion21,
}

impl PollinationsModel {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StableDiffusionXl => "Stable Diffusion XL",
            Self::Kandinsky => "Kandinsky",
            Self::OpenJourney => "OpenJourney",
            Self::StableDiffusion21 => "Stable Diffusion 2.1",
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::StableDiffusionXl => "stable-diffusion-xl",
            Self::Kandinsky => "kandinsky",
            Self::OpenJourney => "openjourney",
            Self::StableDiffusion21 => "stable-diffusion-2.1",
        }
    }

    pub fn all() -> [PollinationsModel; 4] {
        [
            Self::StableDiffusionXl,
            Self::Kandinsky,
            Self::OpenJourney,
            Self::StableDiffusion21,
        ]
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::all().into_iter().find(|m| m.id() == id)
    }
}

/// Choices offered for Stability video generation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoSettings {
    pub cfg_scale_options: Vec<f32>,
    pub motion_bucket_options: Vec<u32>,
    pub frame_options: Vec<u32>,
}

impl VideoSettings {
    pub fn default_cfg_scale(&self) -> f32 {
        self.cfg_scale_options.get(3).copied().unwrap_or(7.0)
    }

    pub fn default_motion_bucket(&self) -> u32 {
        self.motion_bucket_options.first().copied().unwrap_or(127)
    }

    pub fn default_frames(&self) -> u32 {
        self.frame_options.first().copied().unwrap_or(14)
    }
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            cfg_scale_options: vec![1.0, 3.0, 5.0, 7.0, 9.0, 12.0],
            motion_bucket_options: vec![127, 1, 64, 191, 255],
            frame_options: vec![14, 25],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PdfSettings {
    pub temp_directory: String,
    pub default_filename: String,
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            temp_directory: "temp_pdfs".to_string(),
            default_filename: "generated_document.pdf".to_string(),
        }
    }
}
