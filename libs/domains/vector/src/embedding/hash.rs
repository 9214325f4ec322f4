use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::EmbeddingProvider;
use crate::error::VectorResult;

pub const HASH_EMBEDDING_DIMENSION: usize = 384;

/// Deterministic content-hash embedding.
///
/// Equal texts always map to equal vectors and nothing else is meaningful:
/// distances between different texts carry no semantics. For testing only.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    dimension: usize,
}

impl HashEmbeddingProvider {
    pub fn new() -> Self {
        Self::with_dimension(HASH_EMBEDDING_DIMENSION)
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// SHA-256 in counter mode, bytes mapped to [-1, 1], then L2-normalised
    fn hash_embedding(&self, text: &str) -> Vec<f32> {
        let mut values = Vec::with_capacity(self.dimension);
        let mut counter: u32 = 0;

        while values.len() < self.dimension {
            let mut hasher = Sha256::new();
            hasher.update(counter.to_le_bytes());
            hasher.update(text.as_bytes());
            let digest = hasher.finalize();

            let remaining = self.dimension - values.len();
            values.extend(
                digest
                    .iter()
                    .take(remaining)
                    .map(|byte| f32::from(*byte) / 127.5 - 1.0),
            );
            counter += 1;
        }

        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            values.iter_mut().for_each(|v| *v /= norm);
        }
        values
    }
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    fn name(&self) -> &'static str {
        "hash"
    }

    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.hash_embedding(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_embedding_is_deterministic() {
        let provider = HashEmbeddingProvider::new();
        let first = provider.embed("hello").await.unwrap();
        let second = provider.embed("hello").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), HASH_EMBEDDING_DIMENSION);
    }

    #[tokio::test]
    async fn test_hash_embedding_differs_per_text() {
        let provider = HashEmbeddingProvider::new();
        let texts = vec!["hello".to_string(), "world".to_string()];
        let vectors = provider.embed_batch(&texts).await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert_ne!(vectors[0], vectors[1]);
    }

    #[tokio::test]
    async fn test_hash_embedding_is_unit_length() {
        let provider = HashEmbeddingProvider::with_dimension(50);
        let vector = provider.embed("neural networks and AI").await.unwrap();
        assert_eq!(vector.len(), 50);
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "norm was {}", norm);
    }

    #[tokio::test]
    async fn test_hash_embedding_empty_batch() {
        let provider = HashEmbeddingProvider::new();
        assert!(provider.embed_batch(&[]).await.unwrap().is_empty());
    }
}
