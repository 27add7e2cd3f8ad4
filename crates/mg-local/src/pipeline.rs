// crates/mg-local/src/pipeline.rs

use image::RgbaImage;
use log::{debug, info};
use mg_core::{Error, GenerationRequest, Result};
use serde::Serialize;

/// Arguments for one inference call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineCall {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_frames: Option<u32>,
}

impl PipelineCall {
    pub fn image(request: &GenerationRequest) -> Self {
        Self {
            prompt: request.prompt.clone(),
            negative_prompt: request.negative_prompt.clone(),
            num_inference_steps: request.params.num_inference_steps,
            guidance_scale: request.params.guidance_scale,
            num_frames: None,
        }
    }

    pub fn video(request: &GenerationRequest) -> Self {
        Self {
            num_frames: Some(request.params.num_frames),
            ..Self::image(request)
        }
    }
}

/// A loaded diffusion pipeline.
///
/// `acquire` moves the weights onto the accelerator and `release` moves them
/// back and empties the accelerator cache. `release` is called from `Drop`
/// and therefore reports its own failures instead of returning them.
pub trait DiffusionPipeline: Send {
    fn model_id(&self) -> &str;

    fn acquire(&mut self) -> Result<()>;

    fn run(&mut self, call: &PipelineCall) -> Result<Vec<RgbaImage>>;

    fn release(&mut self);
}

/// Builds the heavyweight pipeline for a model id
pub trait PipelineLoader: Send {
    fn load(&self, model_id: &str) -> Result<Box<dyn DiffusionPipeline>>;
}

enum PipelineSlot {
    Unloaded,
    Loaded(Box<dyn DiffusionPipeline>),
}

/// A pipeline that is materialized on first use and only holds the
/// accelerator for the duration of a single call.
pub struct LocalPipeline {
    model_id: String,
    loader: Box<dyn PipelineLoader>,
    slot: PipelineSlot,
}

impl LocalPipeline {
    pub fn new(model_id: impl Into<String>, loader: Box<dyn PipelineLoader>) -> Self {
        Self {
            model_id: model_id.into(),
            loader,
            slot: PipelineSlot::Unloaded,
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.slot, PipelineSlot::Loaded(_))
    }

    fn ensure_loaded(&mut self) -> Result<&mut Box<dyn DiffusionPipeline>> {
        if matches!(self.slot, PipelineSlot::Unloaded) {
            info!("Loading pipeline {}", self.model_id);
            let pipeline = self
                .loader
                .load(&self.model_id)
                .map_err(|e| Error::pipeline(format!("failed to load {}: {}", self.model_id, e)))?;
            self.slot = PipelineSlot::Loaded(pipeline);
        }

        match &mut self.slot {
            PipelineSlot::Loaded(pipeline) => Ok(pipeline),
            PipelineSlot::Unloaded => Err(Error::pipeline(format!(
                "{} is not loaded",
                self.model_id
            ))),
        }
    }

    /// Run exactly one inference. The accelerator is released before this
    /// returns, whether the call succeeded or not.
    pub fn run_once(&mut self, call: &PipelineCall) -> Result<Vec<RgbaImage>> {
        let pipeline = self.ensure_loaded()?;
        let mut guard = AcceleratorGuard::acquire(pipeline)?;
        guard.run(call)
    }
}

struct AcceleratorGuard<'a> {
    pipeline: &'a mut Box<dyn DiffusionPipeline>,
}

impl<'a> AcceleratorGuard<'a> {
    fn acquire(pipeline: &'a mut Box<dyn DiffusionPipeline>) -> Result<Self> {
        // Built first so a half-finished acquire is still released.
        let guard = Self { pipeline };
        debug!("Acquiring accelerator for {}", guard.pipeline.model_id());
        guard.pipeline.acquire()?;
        Ok(guard)
    }

    fn run(&mut self, call: &PipelineCall) -> Result<Vec<RgbaImage>> {
        self.pipeline.run(call)
    }
}

impl Drop for AcceleratorGuard<'_> {
    fn drop(&mut self) {
        debug!("Releasing accelerator for {}", self.pipeline.model_id());
        self.pipeline.release();
    }
}
