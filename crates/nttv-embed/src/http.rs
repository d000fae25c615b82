use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use nttv_core::traits::Embedder;
use nttv_core::{Error, Result};

use crate::l2_normalize;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// Client for an OpenAI-compatible `POST {base}/embeddings` endpoint.
pub struct HttpEmbedder {
    client: reqwest::Client,
    url: String,
    model: String,
    dim: usize,
    id: String,
}

impl HttpEmbedder {
    pub fn new(base_url: &str, model: &str, dim: usize, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::upstream("embedding", e))?;
        Ok(Self {
            client,
            url: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: model.to_string(),
            dim,
            id: format!("http:{model}:d{dim}"),
        })
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = EmbeddingRequest { model: &self.model, input: texts };
        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| Error::upstream("embedding", e))?;
        let mut parsed: EmbeddingResponse = resp.json().await.map_err(|e| Error::upstream("embedding", e))?;
        parsed.data.sort_by_key(|r| r.index);
        if parsed.data.len() != texts.len() {
            return Err(Error::upstream(
                "embedding",
                format!("expected {} vectors, got {}", texts.len(), parsed.data.len()),
            ));
        }
        parsed
            .data
            .into_iter()
            .map(|row| {
                if row.embedding.len() != self.dim {
                    return Err(Error::upstream(
                        "embedding",
                        format!("dimension mismatch: expected {}, got {}", self.dim, row.embedding.len()),
                    ));
                }
                let mut v = row.embedding;
                l2_normalize(&mut v);
                Ok(v)
            })
            .collect()
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = [text.to_string()];
        let mut rows = self.request(&input).await?;
        rows.pop().ok_or_else(|| Error::upstream("embedding", "empty response"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts).await
    }
}
