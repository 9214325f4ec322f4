//! Local embedding via fastembed (ONNX Runtime)
//!
//! The model is downloaded and loaded on first use, then cached for the life
//! of the process. Inference runs on the blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use once_cell::sync::OnceCell;
use tracing::info;

use super::EmbeddingProvider;
use super::provider::ensure_count;
use crate::error::{VectorError, VectorResult};

pub const LOCAL_MODEL_NAME: &str = "all-MiniLM-L6-v2";

/// Local all-MiniLM-L6-v2 sentence embedding (384 dimensions)
#[derive(Clone, Default)]
pub struct LocalEmbeddingProvider {
    model: Arc<OnceCell<TextEmbedding>>,
}

impl LocalEmbeddingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn load(cell: &OnceCell<TextEmbedding>) -> VectorResult<&TextEmbedding> {
        cell.get_or_try_init(|| {
            info!(model = LOCAL_MODEL_NAME, "loading local embedding model");
            TextEmbedding::try_new(
                InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false),
            )
        })
        .map_err(|e| VectorError::Embedding(format!("load {}: {}", LOCAL_MODEL_NAME, e)))
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbeddingProvider {
    fn name(&self) -> &'static str {
        "default"
    }

    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let cell = Arc::clone(&self.model);
        let inputs = texts.to_vec();
        let embeddings = tokio::task::spawn_blocking(move || {
            let model = Self::load(&cell)?;
            model.embed(inputs, None).map_err(|e| {
                VectorError::Embedding(format!("{} inference: {}", LOCAL_MODEL_NAME, e))
            })
        })
        .await
        .map_err(|e| VectorError::Embedding(format!("embedding task failed: {}", e)))??;

        ensure_count(self.name(), texts.len(), embeddings)
    }
}
