//! Embedding collaborator boundary and the batched orchestration over it.
//!
//! The orchestrator feeds cleaned texts to the model in bounded batches and
//! guarantees the output list mirrors the input list exactly, so vectors can
//! be attached to opinions by index. Any count or dimension mismatch is fatal
//! for the run; there are no partial embeddings and no open-ended retries.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::api_types::{EmbeddingsRequest, EmbeddingsResponse};
use crate::config::EmbeddingConfig;
use crate::error::{PipelineError, Result};

#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Embeds a batch of texts, one vector per text, in input order.
    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    /// Expected output dimensionality; 0 when the adapter lets the first
    /// batch decide.
    fn dimension(&self) -> usize;
}

/// HTTP adapter for an OpenAI-compatible `/embeddings` endpoint.
pub struct HttpEmbedder {
    client: Client,
    api_base: String,
    model: String,
    dimension: usize,
}

impl HttpEmbedder {
    pub fn new(client: Client, cfg: &EmbeddingConfig) -> Self {
        HttpEmbedder {
            client,
            api_base: cfg.api_base.clone(),
            model: cfg.model.clone(),
            dimension: cfg.dimension,
        }
    }
}

#[async_trait]
impl TextEmbedder for HttpEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.api_base.trim_end_matches('/'));
        let start = std::time::Instant::now();
        debug!("Embedding call starting - model={}, batch={}", self.model, texts.len());

        let body = EmbeddingsRequest {
            model: &self.model,
            input: texts,
        };
        let resp: EmbeddingsResponse = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // The endpoint may return data out of order; `index` is authoritative.
        let mut data = resp.data;
        data.sort_by_key(|d| d.index);
        let vectors: Vec<Vec<f32>> = data.into_iter().map(|d| d.embedding).collect();

        info!(
            "Embedding call completed - model={}, duration={:.2}s, vectors={}",
            self.model,
            start.elapsed().as_secs_f32(),
            vectors.len()
        );
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Embeds the full text list in batches of `batch_size`, enforcing the
/// one-vector-per-text and fixed-dimension invariants.
pub async fn embed_all(
    embedder: &dyn TextEmbedder,
    texts: &[String],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>> {
    let batch_size = batch_size.max(1);
    let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(texts.len());

    for chunk in texts.chunks(batch_size) {
        let batch = embedder
            .embed_batch(chunk)
            .await
            .map_err(|e| PipelineError::Embedding(e.to_string()))?;
        if batch.len() != chunk.len() {
            return Err(PipelineError::Embedding(format!(
                "collaborator returned {} vectors for {} texts",
                batch.len(),
                chunk.len()
            )));
        }
        vectors.extend(batch);
    }

    // Dimension check: config-declared if present, else whatever the first
    // vector established.
    let expected = match embedder.dimension() {
        0 => vectors.first().map(|v| v.len()).unwrap_or(0),
        d => d,
    };
    if expected == 0 {
        return Err(PipelineError::Embedding(
            "collaborator returned zero-dimension vectors".into(),
        ));
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
        return Err(PipelineError::Embedding(format!(
            "dimension mismatch: expected {}, got {}",
            expected,
            bad.len()
        )));
    }

    Ok(vectors)
}
