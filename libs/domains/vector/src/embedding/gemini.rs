//! Gemini embedding provider
//!
//! Uses the Generative Language API `batchEmbedContents` endpoint with an API
//! key (see <https://aistudio.google.com/app/api-keys>).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::EmbeddingProvider;
use super::provider::ensure_count;
use crate::error::{VectorError, VectorResult};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "text-embedding-004";

/// Gemini provider configuration
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl GeminiConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Fully-qualified model resource name (`models/<model>`)
    fn model_resource(&self) -> String {
        if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        }
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/{}:batchEmbedContents",
            self.base_url.trim_end_matches('/'),
            self.model_resource()
        )
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Gemini embeddings provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

// Gemini request/response types

#[derive(Debug, Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedContentRequest>,
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest {
    model: String,
    content: Content,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let model = self.config.model_resource();
        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: model.clone(),
                    content: Content {
                        parts: vec![Part { text: text.clone() }],
                    },
                })
                .collect(),
        };

        let response = self
            .client
            .post(self.config.endpoint_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(VectorError::Embedding(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let embedding_response: BatchEmbedResponse = response.json().await?;

        ensure_count(
            self.name(),
            texts.len(),
            embedding_response
                .embeddings
                .into_iter()
                .map(|e| e.values)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        let config = GeminiConfig::new("key".to_string());
        assert_eq!(
            config.endpoint_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/text-embedding-004:batchEmbedContents"
        );
    }

    #[test]
    fn test_model_resource_keeps_qualified_names() {
        let config = GeminiConfig::new("key".to_string())
            .with_model("models/gemini-embedding-001".to_string());
        assert_eq!(config.model_resource(), "models/gemini-embedding-001");
    }

    #[test]
    fn test_request_shape() {
        let request = BatchEmbedRequest {
            requests: vec![EmbedContentRequest {
                model: "models/text-embedding-004".to_string(),
                content: Content {
                    parts: vec![Part {
                        text: "hello".to_string(),
                    }],
                },
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json["requests"][0]["content"]["parts"][0]["text"],
            serde_json::json!("hello")
        );
    }
}
