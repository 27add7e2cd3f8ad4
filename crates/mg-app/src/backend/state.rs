use mg_core::VideoSettings;
use crate::generator::Generator;

pub struct AppState {
    pub generator: Generator,
    pub video: VideoSettings,
}

impl AppState {
    pub fn new(generator: Generator, video: VideoSettings) -> Self {
        Self { generator, video }
    }
}
