use serde::{Deserialize, Serialize};

/// A single user-initiated generation. Built once, then only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(default)]
    pub negative_prompt: Option<String>,
    /// Provider model id; `None` picks the provider default
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub params: GenerationParams,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: None,
            model: None,
            params: GenerationParams::default(),
        }
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        let negative_prompt = negative_prompt.into();
        self.negative_prompt = if negative_prompt.trim().is_empty() {
            None
        } else {
            Some(negative_prompt)
        };
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn negative_prompt(&self) -> Option<&str> {
        self.negative_prompt.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Denoising steps for the local pipelines
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    /// Frames rendered by the local video pipeline
    pub num_frames: u32,
    /// Sampling steps sent to Prodia
    pub steps: u32,
    pub cfg_scale: f32,
    pub motion_bucket_id: u32,
    /// Frames requested from Stability
    pub video_frames: u32,
    pub seed: Option<u32>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            num_inference_steps: 50,
            guidance_scale: 7.5,
            num_frames: 16,
            steps: 30,
            cfg_scale: 7.0,
            motion_bucket_id: 127,
            video_frames: 14,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_negative_prompt_is_dropped() {
        let req = GenerationRequest::new("a red fox in snow").with_negative_prompt("   ");
        assert_eq!(req.negative_prompt(), None);
    }

    #[test]
    fn test_partial_params_fill_defaults() {
        let req: GenerationRequest = serde_json::from_str(
            r#"{"prompt": "castle", "params": {"guidance_scale": 12.0}}"#,
        )
        .unwrap();
        assert_eq!(req.params.guidance_scale, 12.0);
        assert_eq!(req.params.num_inference_steps, 50);
        assert_eq!(req.params.motion_bucket_id, 127);
        assert_eq!(req.model, None);
    }
}
