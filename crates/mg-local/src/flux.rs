use image::RgbaImage;
use log::info;
use mg_core::{Error, GenerationRequest, Result};
use crate::pipeline::{LocalPipeline, PipelineCall, PipelineLoader};

pub const FLUX_MODEL: &str = "black-forest-labs/FLUX.1-dev";

/// Text-to-image on the local FLUX.1 pipeline
pub struct FluxGenerator {
    pipeline: LocalPipeline,
}

impl FluxGenerator {
    pub fn new(loader: Box<dyn PipelineLoader>) -> Self {
        Self {
            pipeline: LocalPipeline::new(FLUX_MODEL, loader),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.pipeline.is_loaded()
    }

    pub fn generate_image(&mut self, request: &GenerationRequest) -> Result<RgbaImage> {
        info!(
            "Generating image with {} ({} steps, guidance {})",
            self.pipeline.model_id(),
            request.params.num_inference_steps, request.params.guidance_scale
        );

        self.pipeline
            .run_once(&PipelineCall::image(request))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::pipeline("FLUX pipeline returned no image"))
    }
}
