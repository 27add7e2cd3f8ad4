pub mod artifact;
pub mod document;
pub mod error;
pub mod job;
mod model_types;
pub mod request;

pub use artifact::MediaArtifact;
pub use document::{DocumentContents, DocumentSection, DocumentStructure, SectionContent};
pub use error::{Error, ErrorKind, Result};
pub use job::{GenerationJob, JobStatus};
pub use model_types::{
    MediaKind, PdfSettings, PollinationsModel, ProdiaModel, Service, VideoSettings,
};
pub use request::{GenerationParams, GenerationRequest};
