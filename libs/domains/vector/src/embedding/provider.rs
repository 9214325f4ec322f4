use async_trait::async_trait;

use crate::error::{VectorError, VectorResult};

/// Trait for embedding generation providers
///
/// The same provider embeds documents on insertion and query texts on search,
/// so both sides of a collection live in the same vector space.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &'static str;

    /// Generate embeddings for multiple texts, one vector per input, in input order
    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> VectorResult<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| VectorError::Embedding("No embedding returned".to_string()))
    }
}

/// Reject provider responses that do not line up with the request
pub(crate) fn ensure_count(
    provider: &str,
    expected: usize,
    embeddings: Vec<Vec<f32>>,
) -> VectorResult<Vec<Vec<f32>>> {
    if embeddings.len() != expected {
        return Err(VectorError::Embedding(format!(
            "{} returned {} embeddings for {} inputs",
            provider,
            embeddings.len(),
            expected
        )));
    }
    Ok(embeddings)
}
