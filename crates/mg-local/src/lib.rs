pub mod encode;
pub mod flux;
pub mod mochi;
pub mod pipeline;
pub mod service;

pub use flux::FluxGenerator;
pub use mochi::MochiGenerator;
pub use pipeline::{DiffusionPipeline, LocalPipeline, PipelineCall, PipelineLoader};
pub use service::ServiceLoader;
