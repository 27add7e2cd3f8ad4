use std::env;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::Context;
use mg_core::{PdfSettings, VideoSettings};

/// Backoff and deadline for submit-and-poll providers
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub deadline: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(8),
            deadline: Duration::from_secs(300),
        }
    }
}

/// Process-wide settings, read once at startup and handed to every client.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,

    pub prodia_api_key: String,
    pub stability_api_key: String,
    pub openai_api_key: String,

    pub prodia_base_url: String,
    pub stability_base_url: String,
    pub pollinations_base_url: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub local_pipeline_url: String,

    pub http_timeout: Duration,
    pub pipeline_timeout: Duration,
    pub poll: PollConfig,

    pub media_temp_dir: PathBuf,
    pub pdf: PdfSettings,
    pub video: VideoSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8501,
            prodia_api_key: String::new(),
            stability_api_key: String::new(),
            openai_api_key: String::new(),
            prodia_base_url: "https://api.prodia.com/v1".to_string(),
            stability_base_url: "https://api.stability.ai/v1".to_string(),
            pollinations_base_url: "https://image.pollinations.ai/prompt".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            local_pipeline_url: "http://127.0.0.1:5000".to_string(),
            http_timeout: Duration::from_secs(60),
            pipeline_timeout: Duration::from_secs(1800),
            poll: PollConfig::default(),
            media_temp_dir: PathBuf::from("."),
            pdf: PdfSettings::default(),
            video: VideoSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment
    pub fn load() -> anyhow::Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::info!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e).context("failed to read .env"),
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut conf = Self::default();
        let string = |key: &str, target: &mut String| {
            if let Some(value) = lookup(key) {
                *target = value;
            }
        };

        string("PRODIA_API_KEY", &mut conf.prodia_api_key);
        string("STABILITY_API_KEY", &mut conf.stability_api_key);
        string("OPENAI_API_KEY", &mut conf.openai_api_key);
        string("PRODIA_BASE_URL", &mut conf.prodia_base_url);
        string("STABILITY_BASE_URL", &mut conf.stability_base_url);
        string("POLLINATIONS_BASE_URL", &mut conf.pollinations_base_url);
        string("OPENAI_BASE_URL", &mut conf.openai_base_url);
        string("OPENAI_MODEL", &mut conf.openai_model);
        string("LOCAL_PIPELINE_URL", &mut conf.local_pipeline_url);
        string("PDF_TEMP_DIR", &mut conf.pdf.temp_directory);

        if let Some(dir) = lookup("MEDIA_TEMP_DIR") {
            conf.media_temp_dir = PathBuf::from(dir);
        }
        if let Some(port) = number::<u16>(&lookup, "PORT")? {
            conf.port = port;
        }
        if let Some(secs) = number::<u64>(&lookup, "HTTP_TIMEOUT_SECS")? {
            conf.http_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = number::<u64>(&lookup, "PIPELINE_TIMEOUT_SECS")? {
            conf.pipeline_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = number::<u64>(&lookup, "POLL_INITIAL_MS")? {
            conf.poll.initial_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = number::<u64>(&lookup, "POLL_MAX_MS")? {
            conf.poll.max_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = number::<u64>(&lookup, "POLL_DEADLINE_SECS")? {
            conf.poll.deadline = Duration::from_secs(secs);
        }

        if conf.poll.initial_interval.is_zero() {
            anyhow::bail!("POLL_INITIAL_MS must be greater than zero");
        }
        if conf.poll.max_interval < conf.poll.initial_interval {
            anyhow::bail!("POLL_MAX_MS must not be smaller than POLL_INITIAL_MS");
        }

        Ok(conf)
    }

    pub fn pdf_dir(&self) -> PathBuf {
        PathBuf::from(&self.pdf.temp_directory)
    }
}

fn number<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{key} must be a number, got '{raw}'"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let conf = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(conf.port, 8501);
        assert_eq!(conf.prodia_api_key, "");
        assert_eq!(conf.openai_model, "gpt-4o-mini");
        assert_eq!(conf.poll, PollConfig::default());
        assert_eq!(conf.pdf_dir(), PathBuf::from("temp_pdfs"));
    }

    #[test]
    fn test_overrides() {
        let conf = AppConfig::from_lookup(lookup(&[
            ("PRODIA_API_KEY", "pk"),
            ("PORT", "9000"),
            ("POLL_INITIAL_MS", "10"),
            ("POLL_MAX_MS", "40"),
            ("POLL_DEADLINE_SECS", "2"),
            ("PDF_TEMP_DIR", "/tmp/docs"),
        ]))
        .unwrap();

        assert_eq!(conf.prodia_api_key, "pk");
        assert_eq!(conf.port, 9000);
        assert_eq!(conf.poll.initial_interval, Duration::from_millis(10));
        assert_eq!(conf.poll.max_interval, Duration::from_millis(40));
        assert_eq!(conf.poll.deadline, Duration::from_secs(2));
        assert_eq!(conf.pdf_dir(), PathBuf::from("/tmp/docs"));
    }

    #[test]
    fn test_bad_number_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT must be a number"));
    }

    #[test]
    fn test_zero_initial_interval_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("POLL_INITIAL_MS", "0")])).unwrap_err();
        assert!(err.to_string().contains("POLL_INITIAL_MS must be greater than zero"));
    }

    #[test]
    fn test_inverted_backoff_is_rejected() {
        let result = AppConfig::from_lookup(lookup(&[
            ("POLL_INITIAL_MS", "500"),
            ("POLL_MAX_MS", "100"),
        ]));
        assert!(result.is_err());
    }
}
