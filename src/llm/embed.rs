use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;
use crate::errors::EmbedError;

/// The Embedding Client: maps a query string to a fixed-dimension vector.
/// Stateless, safe for concurrent use.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}

/// HTTP-backed embedding client, grounded on the teacher's
/// `EMBED_SERVER_URL` config field (`etl::embed::embed_text` was a
/// placeholder returning a constant vector; this replaces it with a real
/// HTTP call).
pub struct HttpEmbeddingClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    dim: usize,
    timeout_ms: u64,
}

impl HttpEmbeddingClient {
    pub fn new(cfg: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: cfg.embed_server_url.clone(),
            model: cfg.embed_model.clone(),
            dim: cfg.embed_dim,
            timeout_ms: cfg.collaborator_timeout_ms,
        }
    }
}

#[derive(Deserialize)]
struct EmbedResponseDirect {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbedResponseOpenAiShaped {
    data: Vec<EmbedResponseOpenAiEntry>,
}

#[derive(Deserialize)]
struct EmbedResponseOpenAiEntry {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingClient for HttpEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let request = self.http.post(&self.base_url).json(&json!({ "input": text, "model": self.model }));

        let raw = match tokio::time::timeout(Duration::from_millis(self.timeout_ms), async {
            let body = request.send().await?.error_for_status()?;
            body.text().await
        })
        .await
        {
            Ok(result) => result?,
            Err(_) => return Err(EmbedError::Timeout),
        };

        let vector = if let Ok(direct) = serde_json::from_str::<EmbedResponseDirect>(&raw) {
            direct.embedding
        } else if let Ok(openai) = serde_json::from_str::<EmbedResponseOpenAiShaped>(&raw) {
            openai
                .data
                .into_iter()
                .next()
                .map(|e| e.embedding)
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        if vector.len() != self.dim {
            return Err(EmbedError::DimensionMismatch {
                expected: self.dim,
                actual: vector.len(),
            });
        }

        Ok(vector)
    }
}
