use image::RgbaImage;
use log::info;
use mg_core::{Error, GenerationRequest, Result};
use crate::encode;
use crate::pipeline::{LocalPipeline, PipelineCall, PipelineLoader};

pub const MOCHI_MODEL: &str = "genmo/mochi-1-preview";

/// Text-to-video on the local Mochi pipeline
pub struct MochiGenerator {
    pipeline: LocalPipeline,
}

impl MochiGenerator {
    pub fn new(loader: Box<dyn PipelineLoader>) -> Self {
        Self {
            pipeline: LocalPipeline::new(MOCHI_MODEL, loader),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.pipeline.is_loaded()
    }

    pub fn generate_video(&mut self, request: &GenerationRequest) -> Result<Vec<RgbaImage>> {
        info!(
            "Generating {} frames with {} ({} steps)",
            request.params.num_frames,
            self.pipeline.model_id(),
            request.params.num_inference_steps
        );

        let frames = self.pipeline.run_once(&PipelineCall::video(request))?;
        if frames.is_empty() {
            return Err(Error::pipeline("Mochi pipeline returned no frames"));
        }
        Ok(frames)
    }

    /// Render the video and save it as a GIF in memory
    pub fn generate_gif(&mut self, request: &GenerationRequest) -> Result<Vec<u8>> {
        let frames = self.generate_video(request)?;
        encode::encode_gif(frames, encode::GIF_FPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use mg_core::GenerationParams;
    use crate::pipeline::tests::{MockLoader, Tally};

    fn mochi() -> (MochiGenerator, Arc<Tally>) {
        let tally = Arc::new(Tally::default());
        let generator = MochiGenerator::new(Box::new(MockLoader {
            tally: tally.clone(),
            frames: 1,
        }));
        (generator, tally)
    }

    #[test]
    fn test_frame_count_is_forwarded() {
        let (mut mochi, tally) = mochi();
        let request = GenerationRequest::new("A butterfly flying through a magical forest")
            .with_params(GenerationParams {
                num_frames: 24,
                ..Default::default()
            });

        let frames = mochi.generate_video(&request).unwrap();

        assert_eq!(frames.len(), 24);
        assert!(!tally.on_accelerator.load(Ordering::SeqCst));
    }

    #[test]
    fn test_gif_output() {
        let (mut mochi, _) = mochi();
        let gif = mochi
            .generate_gif(&GenerationRequest::new("waves on a beach"))
            .unwrap();
        assert_eq!(&gif[..6], b"GIF89a");
    }

    #[test]
    fn test_failure_still_releases() {
        let (mut mochi, tally) = mochi();
        tally.fail_run.store(true, Ordering::SeqCst);

        assert!(mochi.generate_video(&GenerationRequest::new("waves")).is_err());
        assert!(!tally.on_accelerator.load(Ordering::SeqCst));
        assert_eq!(tally.releases.load(Ordering::SeqCst), 1);
    }
}
