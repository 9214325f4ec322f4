use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, warn};

use super::{EmbeddingProvider, GeminiConfig, GeminiProvider, HashEmbeddingProvider};
use super::{OpenAIConfig, OpenAIProvider};
use crate::error::{VectorError, VectorResult};

/// Embedding backend selector as given on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingKind {
    /// Local ONNX model, no credentials
    #[default]
    Default,
    /// Deterministic content hash, for testing
    Hash,
    Gemini,
    OpenAI,
}

impl EmbeddingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingKind::Default => "default",
            EmbeddingKind::Hash => "hash",
            EmbeddingKind::Gemini => "gemini",
            EmbeddingKind::OpenAI => "openai",
        }
    }
}

impl FromStr for EmbeddingKind {
    type Err = VectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "default" => Ok(EmbeddingKind::Default),
            "hash" => Ok(EmbeddingKind::Hash),
            "gemini" => Ok(EmbeddingKind::Gemini),
            "openai" => Ok(EmbeddingKind::OpenAI),
            other => Err(VectorError::Config(format!(
                "unknown embedding function '{}' (expected 'default', 'hash', 'gemini' or 'openai')",
                other
            ))),
        }
    }
}

impl fmt::Display for EmbeddingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved embedding configuration; each backend carries only its own credentials
#[derive(Clone, PartialEq, Eq)]
pub enum EmbeddingConfig {
    Default,
    Hash,
    Gemini {
        api_key: Option<String>,
        model: String,
    },
    OpenAI {
        api_key: Option<String>,
        base_url: Option<String>,
        model: String,
    },
}

impl EmbeddingConfig {
    pub fn kind(&self) -> EmbeddingKind {
        match self {
            EmbeddingConfig::Default => EmbeddingKind::Default,
            EmbeddingConfig::Hash => EmbeddingKind::Hash,
            EmbeddingConfig::Gemini { .. } => EmbeddingKind::Gemini,
            EmbeddingConfig::OpenAI { .. } => EmbeddingKind::OpenAI,
        }
    }
}

impl fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        match self {
            EmbeddingConfig::Default => f.write_str("Default"),
            EmbeddingConfig::Hash => f.write_str("Hash"),
            EmbeddingConfig::Gemini { api_key, model } => f
                .debug_struct("Gemini")
                .field("api_key", &redact(api_key))
                .field("model", model)
                .finish(),
            EmbeddingConfig::OpenAI {
                api_key,
                base_url,
                model,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &redact(api_key))
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Build the embedding provider for a configuration.
///
/// Credential checks happen here, before any network traffic.
pub fn select_embedding(config: &EmbeddingConfig) -> VectorResult<Arc<dyn EmbeddingProvider>> {
    match config {
        EmbeddingConfig::Hash => {
            warn!("using hash embedding (testing only)");
            Ok(Arc::new(HashEmbeddingProvider::new()))
        }

        EmbeddingConfig::Gemini { api_key, model } => {
            let api_key = present(api_key).ok_or_else(|| {
                VectorError::config(
                    "GEMINI_API_KEY not set (see https://aistudio.google.com/app/api-keys)",
                )
            })?;
            info!(model = %model, "using Gemini embedding");
            Ok(Arc::new(GeminiProvider::new(
                GeminiConfig::new(api_key.to_string()).with_model(model.clone()),
            )))
        }

        EmbeddingConfig::OpenAI {
            api_key,
            base_url,
            model,
        } => {
            let api_key = present(api_key)
                .ok_or_else(|| VectorError::config("--openai-api-key or OPENAI_API_KEY not set"))?;
            let base_url = present(base_url).ok_or_else(|| {
                VectorError::config("--openai-base-url or OPENAI_BASE_URL not set")
            })?;
            info!(base_url = %base_url, model = %model, "using OpenAI embedding");
            Ok(Arc::new(OpenAIProvider::new(
                OpenAIConfig::new(api_key.to_string())
                    .with_base_url(base_url.to_string())
                    .with_model(model.clone()),
            )))
        }

        EmbeddingConfig::Default => select_local(),
    }
}

#[cfg(feature = "local-embedding")]
fn select_local() -> VectorResult<Arc<dyn EmbeddingProvider>> {
    info!(model = super::LOCAL_MODEL_NAME, "using default ONNX embedding");
    Ok(Arc::new(super::LocalEmbeddingProvider::new()))
}

#[cfg(not(feature = "local-embedding"))]
fn select_local() -> VectorResult<Arc<dyn EmbeddingProvider>> {
    Err(VectorError::config(
        "default embedding requires the `local-embedding` feature; use --embedding hash, gemini or openai",
    ))
}
