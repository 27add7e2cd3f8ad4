use std::time::Duration;
use axum::Router;
use tokio::sync::oneshot;
use crate::config::{AppConfig, PollConfig};

/// A mock backend served on an ephemeral local port
pub struct MockServer {
    pub base_url: String,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockServer {
    pub async fn start(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Self {
            base_url: format!("http://{}", addr),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Config with fast polling, every remote pointed at `base_url`
pub fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        prodia_api_key: "prodia-key".into(),
        stability_api_key: "stability-key".into(),
        openai_api_key: "openai-key".into(),
        prodia_base_url: base_url.to_string(),
        stability_base_url: base_url.to_string(),
        pollinations_base_url: format!("{}/prompt", base_url),
        openai_base_url: base_url.to_string(),
        local_pipeline_url: base_url.to_string(),
        http_timeout: Duration::from_secs(5),
        poll: PollConfig {
            initial_interval: Duration::from_millis(5),
            max_interval: Duration::from_millis(20),
            deadline: Duration::from_secs(5),
        },
        ..AppConfig::default()
    }
}
