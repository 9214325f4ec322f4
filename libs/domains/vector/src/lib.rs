//! Vector Domain Library
//!
//! Document storage and similarity search against a Chroma server, with
//! embeddings computed client-side.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │     Session     │  ← open: heartbeat, embedding, get-or-create collection
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐     ┌──────────────────┐
//! │  VectorClient   │     │ EmbeddingProvider│
//! │  Collection     │────▶│    (trait)       │
//! │   (traits)      │     └────────┬─────────┘
//! └────────┬────────┘              │
//! ┌────────▼────────┐     ┌────────▼─────────┐
//! │  ChromaClient   │     │ Local (ONNX)     │
//! │ ChromaCollection│     │ Hash / Gemini    │
//! └─────────────────┘     │ OpenAI           │
//!                         └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_vector::{
//!     ChromaConfig, DistanceMetric, EmbeddingConfig, Page, Session, SessionConfig,
//!     load_documents, AddMode,
//! };
//!
//! # async fn example() -> Result<(), domain_vector::VectorError> {
//! let config = SessionConfig {
//!     server: ChromaConfig::default(),
//!     embedding: EmbeddingConfig::Hash,
//!     distance: DistanceMetric::L2,
//! };
//!
//! let mut session = Session::open(&config).await?;
//! let documents = load_documents("documents.yaml")?;
//! session.collection()?.add(&documents, AddMode::Insert).await?;
//!
//! let page = session.collection()?.get(Page::default()).await?;
//! println!("{} documents", page.len());
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod chroma;
pub mod embedding;
pub mod error;
pub mod loader;
pub mod models;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use chroma::{ChromaClient, ChromaConfig, DEFAULT_CHROMA_URL};
pub use embedding::{EmbeddingConfig, EmbeddingKind, EmbeddingProvider, select_embedding};
pub use error::{VectorError, VectorResult};
pub use loader::load_documents;
pub use models::{
    AddMode, COLLECTION_NAME, CollectionSpec, DistanceMetric, Document, Metadata, Page,
    QueryMatch, StoredDocument, parse_distance_metric,
};
pub use session::{Session, SessionConfig};
pub use store::{Collection, VectorClient};
