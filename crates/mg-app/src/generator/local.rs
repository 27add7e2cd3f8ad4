use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use tracing::info;
use mg_core::{Error, GenerationRequest, MediaArtifact, Result};
use mg_local::encode::encode_png;
use mg_local::{FluxGenerator, MochiGenerator};
use crate::generator::provider::ProviderClient;

pub const FLUX_FILE_NAME: &str = "flux_generated_image.png";
pub const MOCHI_FILE_NAME: &str = "mochi_generated_video.gif";

/// Held for the whole of one local inference. Every local provider shares
/// the same lock, so only one pipeline sits on the accelerator at a time.
pub type AcceleratorLock = Arc<Mutex<()>>;

/// Run blocking pipeline work off the async runtime. The accelerator lock is
/// taken before the generator lock.
async fn run_blocking<G, T, F>(
    name: &'static str,
    accelerator: &AcceleratorLock,
    generator: &Arc<Mutex<G>>,
    work: F,
) -> Result<T>
where
    G: Send + 'static,
    T: Send + 'static,
    F: FnOnce(&mut G) -> Result<T> + Send + 'static,
{
    let accelerator = accelerator.clone();
    let generator = generator.clone();
    tokio::task::spawn_blocking(move || {
        let _accelerator = accelerator
            .lock()
            .map_err(|_| Error::pipeline("accelerator lock poisoned"))?;
        let mut generator = generator
            .lock()
            .map_err(|_| Error::pipeline(format!("{name} pipeline lock poisoned")))?;
        work(&mut *generator)
    })
    .await
    .map_err(|e| Error::pipeline(format!("{name} worker stopped: {e}")))?
}

/// FLUX.1 images as PNG
pub struct FluxProvider {
    accelerator: AcceleratorLock,
    generator: Arc<Mutex<FluxGenerator>>,
}

impl FluxProvider {
    pub fn new(generator: FluxGenerator, accelerator: AcceleratorLock) -> Self {
        Self {
            accelerator,
            generator: Arc::new(Mutex::new(generator)),
        }
    }
}

#[async_trait]
impl ProviderClient for FluxProvider {
    fn name(&self) -> &str {
        "flux"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<MediaArtifact> {
        let request = request.clone();
        let png = run_blocking("flux", &self.accelerator, &self.generator, move |flux| {
            let image = flux.generate_image(&request)?;
            encode_png(&image)
        })
        .await?;

        info!(bytes = png.len(), "FLUX image encoded");
        Ok(MediaArtifact::inline(png, "image/png", FLUX_FILE_NAME))
    }
}

/// Mochi videos as looping GIFs
pub struct MochiProvider {
    accelerator: AcceleratorLock,
    generator: Arc<Mutex<MochiGenerator>>,
}

impl MochiProvider {
    pub fn new(generator: MochiGenerator, accelerator: AcceleratorLock) -> Self {
        Self {
            accelerator,
            generator: Arc::new(Mutex::new(generator)),
        }
    }
}

#[async_trait]
impl ProviderClient for MochiProvider {
    fn name(&self) -> &str {
        "mochi"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<MediaArtifact> {
        let request = request.clone();
        let gif = run_blocking("mochi", &self.accelerator, &self.generator, move |mochi| {
            mochi.generate_gif(&request)
        })
        .await?;

        info!(bytes = gif.len(), "Mochi video encoded");
        Ok(MediaArtifact::inline(gif, "image/gif", MOCHI_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use image::{Rgba, RgbaImage};
    use mg_core::ErrorKind;
    use mg_local::{DiffusionPipeline, PipelineCall, PipelineLoader};

    /// How many pipelines are on the accelerator now, and the most seen at once
    #[derive(Default)]
    struct Occupancy {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    struct SolidPipeline {
        model_id: String,
        fail: bool,
        occupancy: Arc<Occupancy>,
    }

    impl DiffusionPipeline for SolidPipeline {
        fn model_id(&self) -> &str {
            &self.model_id
        }

        fn acquire(&mut self) -> Result<()> {
            let now = self.occupancy.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.occupancy.peak.fetch_max(now, Ordering::SeqCst);
            Ok(())
        }

        fn run(&mut self, call: &PipelineCall) -> Result<Vec<RgbaImage>> {
            if self.fail {
                return Err(Error::pipeline("CUDA out of memory"));
            }
            std::thread::sleep(Duration::from_millis(50));
            let frames = call.num_frames.unwrap_or(1) as usize;
            Ok(vec![RgbaImage::from_pixel(4, 4, Rgba([0, 128, 255, 255])); frames])
        }

        fn release(&mut self) {
            self.occupancy.current.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct SolidLoader {
        fail: bool,
        occupancy: Arc<Occupancy>,
    }

    impl PipelineLoader for SolidLoader {
        fn load(&self, model_id: &str) -> Result<Box<dyn DiffusionPipeline>> {
            Ok(Box::new(SolidPipeline {
                model_id: model_id.to_string(),
                fail: self.fail,
                occupancy: self.occupancy.clone(),
            }))
        }
    }

    fn flux(loader: SolidLoader, accelerator: &AcceleratorLock) -> FluxProvider {
        FluxProvider::new(FluxGenerator::new(Box::new(loader)), accelerator.clone())
    }

    fn mochi(loader: SolidLoader, accelerator: &AcceleratorLock) -> MochiProvider {
        MochiProvider::new(MochiGenerator::new(Box::new(loader)), accelerator.clone())
    }

    #[tokio::test]
    async fn test_flux_returns_png() {
        let provider = flux(SolidLoader::default(), &AcceleratorLock::default());

        let artifact = provider
            .generate(&GenerationRequest::new("Astronaut in a jungle"))
            .await
            .unwrap();

        let MediaArtifact::Inline { bytes, mime, file_name } = artifact else {
            panic!("expected inline media");
        };
        assert_eq!(&bytes[..4], b"\x89PNG");
        assert_eq!(mime, "image/png");
        assert_eq!(file_name, FLUX_FILE_NAME);
    }

    #[tokio::test]
    async fn test_mochi_returns_gif() {
        let provider = mochi(SolidLoader::default(), &AcceleratorLock::default());

        let artifact = provider
            .generate(&GenerationRequest::new("waves on a beach"))
            .await
            .unwrap();

        assert_eq!(artifact.mime(), Some("image/gif"));
        assert!(!artifact.is_empty());
    }

    #[tokio::test]
    async fn test_inference_failure_is_resource_error() {
        let loader = SolidLoader {
            fail: true,
            ..Default::default()
        };
        let provider = flux(loader, &AcceleratorLock::default());

        let err = provider
            .generate(&GenerationRequest::new("Astronaut in a jungle"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Resource);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_local_pipelines_take_turns_on_accelerator() {
        let occupancy = Arc::new(Occupancy::default());
        let accelerator = AcceleratorLock::default();
        let loader = || SolidLoader {
            fail: false,
            occupancy: occupancy.clone(),
        };
        let flux = flux(loader(), &accelerator);
        let mochi = mochi(loader(), &accelerator);

        let image_request = GenerationRequest::new("Astronaut in a jungle");
        let video_request = GenerationRequest::new("waves on a beach");
        let (image, video) = tokio::join!(
            flux.generate(&image_request),
            mochi.generate(&video_request),
        );

        assert!(image.is_ok());
        assert!(video.is_ok());
        assert_eq!(occupancy.peak.load(Ordering::SeqCst), 1);
        assert_eq!(occupancy.current.load(Ordering::SeqCst), 0);
    }
}
