use std::sync::Arc;

use async_trait::async_trait;

use crate::embedding::EmbeddingProvider;
use crate::error::VectorResult;
use crate::models::{AddMode, CollectionSpec, Document, Page, QueryMatch, StoredDocument};

/// Connection to a vector-store server
///
/// This trait abstracts the underlying vector database (Chroma).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorClient: Send + Sync {
    /// Liveness check
    async fn heartbeat(&self) -> VectorResult<()>;

    /// Resolve the collection by name, creating it with `spec` if absent.
    /// The returned handle embeds texts with `embedder`.
    async fn get_or_create_collection(
        &self,
        spec: &CollectionSpec,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> VectorResult<Box<dyn Collection>>;

    /// Release the connection
    async fn close(&self) -> VectorResult<()>;
}

/// Operations on one resolved collection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Collection: Send + Sync {
    /// Insert (or upsert) documents in a single all-or-nothing request
    async fn add(&self, documents: &[Document], mode: AddMode) -> VectorResult<()>;

    /// Paginated fetch including documents and metadata
    async fn get(&self, page: Page) -> VectorResult<Vec<StoredDocument>>;

    /// Nearest-neighbour search; one result group per query text
    async fn query(&self, texts: &[String], n_results: u32)
    -> VectorResult<Vec<Vec<QueryMatch>>>;

    /// Delete by id; ids that do not exist are ignored by the server
    async fn delete(&self, ids: &[String]) -> VectorResult<()>;

    /// Number of documents in the collection
    async fn count(&self) -> VectorResult<u64>;
}
