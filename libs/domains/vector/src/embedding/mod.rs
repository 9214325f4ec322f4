mod config;
mod gemini;
mod hash;
#[cfg(feature = "local-embedding")]
mod local;
mod openai;
mod provider;

pub use config::{EmbeddingConfig, EmbeddingKind, select_embedding};
pub use gemini::{DEFAULT_GEMINI_MODEL, GeminiConfig, GeminiProvider};
pub use hash::{HASH_EMBEDDING_DIMENSION, HashEmbeddingProvider};
#[cfg(feature = "local-embedding")]
pub use local::{LOCAL_MODEL_NAME, LocalEmbeddingProvider};
pub use openai::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL, OpenAIConfig, OpenAIProvider};
pub use provider::EmbeddingProvider;

#[cfg(test)]
pub use provider::MockEmbeddingProvider;
