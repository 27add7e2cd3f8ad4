use std::path::PathBuf;

/// Output of a generation request.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaArtifact {
    /// Media hosted by the provider
    Url(String),
    /// Media held in memory
    Inline {
        bytes: Vec<u8>,
        mime: String,
        file_name: String,
    },
    /// Media written to a temp file by the client. The caller deletes it.
    TempFile {
        path: PathBuf,
        mime: String,
        file_name: String,
    },
}

impl MediaArtifact {
    pub fn inline(bytes: Vec<u8>, mime: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self::Inline {
            bytes,
            mime: mime.into(),
            file_name: file_name.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Url(url) => url.is_empty(),
            Self::Inline { bytes, .. } => bytes.is_empty(),
            Self::TempFile { path, .. } => path.as_os_str().is_empty(),
        }
    }

    pub fn mime(&self) -> Option<&str> {
        match self {
            Self::Url(_) => None,
            Self::Inline { mime, .. } | Self::TempFile { mime, .. } => Some(mime),
        }
    }
}
