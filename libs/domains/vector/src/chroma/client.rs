use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::ChromaConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{VectorError, VectorResult};
use crate::models::{
    AddMode, CollectionSpec, Document, Metadata, Page, QueryMatch, StoredDocument,
};
use crate::store::{Collection, VectorClient};

type JsonMap = Map<String, Value>;

/// Chroma v2 HTTP implementation of VectorClient
pub struct ChromaClient {
    http: Client,
    base_url: String,
    tenant: String,
    database: String,
}

impl ChromaClient {
    pub fn new(config: ChromaConfig) -> VectorResult<Self> {
        let url = Url::parse(&config.url).map_err(|e| {
            VectorError::Config(format!("invalid server URL '{}': {}", config.url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(VectorError::Config(format!(
                "invalid server URL '{}': expected http or https",
                config.url
            )));
        }

        Ok(Self {
            http: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            tenant: config.tenant,
            database: config.database,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collections_url(&self) -> String {
        format!(
            "{}/api/v2/tenants/{}/databases/{}/collections",
            self.base_url, self.tenant, self.database
        )
    }
}

// ===== Wire types =====

#[derive(Debug, Serialize)]
struct CreateCollectionRequest<'a> {
    name: &'a str,
    metadata: BTreeMap<&'static str, &'a str>,
    get_or_create: bool,
}

#[derive(Debug, Deserialize)]
struct CollectionModel {
    id: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct AddRequest<'a> {
    ids: Vec<&'a str>,
    embeddings: Vec<Vec<f32>>,
    documents: Vec<&'a str>,
    metadatas: Vec<Option<&'a Metadata>>,
}

#[derive(Debug, Serialize)]
struct GetRequest {
    limit: u32,
    offset: u32,
    include: [&'static str; 2],
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    ids: Vec<String>,
    #[serde(default)]
    documents: Option<Vec<Option<String>>>,
    #[serde(default)]
    metadatas: Option<Vec<Option<JsonMap>>>,
}

#[derive(Debug, Serialize)]
struct QueryRequest {
    query_embeddings: Vec<Vec<f32>>,
    n_results: u32,
    include: [&'static str; 3],
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<JsonMap>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<Option<f32>>>>,
}

#[derive(Debug, Serialize)]
struct DeleteRequest<'a> {
    ids: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

// ===== HTTP helpers =====

fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            message: Some(message),
            ..
        }) => format!("{}: {}", status, message),
        Ok(ErrorBody {
            error: Some(error),
            ..
        }) => format!("{}: {}", status, error),
        _ if body.trim().is_empty() => status.to_string(),
        _ => format!("{}: {}", status, body.trim()),
    }
}

async fn send(request: RequestBuilder, operation: &str) -> VectorResult<reqwest::Response> {
    let response = request
        .send()
        .await
        .map_err(|e| VectorError::remote(operation, e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(VectorError::remote(operation, error_message(status, &body)));
    }
    Ok(response)
}

async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    operation: &str,
) -> VectorResult<T> {
    send(request, operation)
        .await?
        .json::<T>()
        .await
        .map_err(|e| VectorError::remote(operation, format!("invalid response: {}", e)))
}

/// Only string-valued metadata is kept
fn metadata_from_json(map: Option<JsonMap>) -> Metadata {
    map.into_iter()
        .flatten()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            _ => None,
        })
        .collect()
}

fn cell<T: Clone>(column: &[Vec<Option<T>>], group: usize, index: usize) -> Option<T> {
    column
        .get(group)
        .and_then(|row| row.get(index))
        .cloned()
        .flatten()
}

#[async_trait]
impl VectorClient for ChromaClient {
    async fn heartbeat(&self) -> VectorResult<()> {
        let url = format!("{}/api/v2/heartbeat", self.base_url);
        let _: Value = send_json(self.http.get(url), "heartbeat").await?;
        Ok(())
    }

    async fn get_or_create_collection(
        &self,
        spec: &CollectionSpec,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> VectorResult<Box<dyn Collection>> {
        let request = CreateCollectionRequest {
            name: &spec.name,
            metadata: BTreeMap::from([
                ("description", spec.description.as_str()),
                ("hnsw:space", spec.distance.as_str()),
            ]),
            get_or_create: true,
        };

        let model: CollectionModel = send_json(
            self.http.post(self.collections_url()).json(&request),
            "get or create collection",
        )
        .await?;
        debug!(id = %model.id, name = %model.name, "resolved collection");

        Ok(Box::new(ChromaCollection {
            http: self.http.clone(),
            url: format!("{}/{}", self.collections_url(), model.id),
            embedder,
        }))
    }

    async fn close(&self) -> VectorResult<()> {
        // Pooled connections are released when the client is dropped
        debug!(url = %self.base_url, "closing vector store client");
        Ok(())
    }
}

/// Handle to one Chroma collection; embeds texts client-side before sending
pub struct ChromaCollection {
    http: Client,
    url: String,
    embedder: Arc<dyn EmbeddingProvider>,
}

#[async_trait]
impl Collection for ChromaCollection {
    async fn add(&self, documents: &[Document], mode: AddMode) -> VectorResult<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let request = AddRequest {
            ids: documents.iter().map(|d| d.id.as_str()).collect(),
            embeddings,
            documents: documents.iter().map(|d| d.text.as_str()).collect(),
            metadatas: documents
                .iter()
                .map(|d| (!d.metadata.is_empty()).then_some(&d.metadata))
                .collect(),
        };

        let (route, operation) = match mode {
            AddMode::Insert => ("add", "add documents"),
            AddMode::Upsert => ("upsert", "upsert documents"),
        };

        send(
            self.http
                .post(format!("{}/{}", self.url, route))
                .json(&request),
            operation,
        )
        .await?;
        Ok(())
    }

    async fn get(&self, page: Page) -> VectorResult<Vec<StoredDocument>> {
        let request = GetRequest {
            limit: page.limit,
            offset: page.offset,
            include: ["documents", "metadatas"],
        };

        let response: GetResponse = send_json(
            self.http.post(format!("{}/get", self.url)).json(&request),
            "get documents",
        )
        .await?;

        let mut texts = response.documents.unwrap_or_default().into_iter();
        let mut metadatas = response.metadatas.unwrap_or_default().into_iter();

        Ok(response
            .ids
            .into_iter()
            .map(|id| StoredDocument {
                id,
                text: texts.next().flatten(),
                metadata: metadata_from_json(metadatas.next().flatten()),
            })
            .collect())
    }

    async fn query(
        &self,
        texts: &[String],
        n_results: u32,
    ) -> VectorResult<Vec<Vec<QueryMatch>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let request = QueryRequest {
            query_embeddings: self.embedder.embed_batch(texts).await?,
            n_results,
            include: ["documents", "metadatas", "distances"],
        };

        let response: QueryResponse = send_json(
            self.http.post(format!("{}/query", self.url)).json(&request),
            "query",
        )
        .await?;

        let documents = response.documents.unwrap_or_default();
        let metadatas = response.metadatas.unwrap_or_default();
        let distances = response.distances.unwrap_or_default();

        Ok(response
            .ids
            .into_iter()
            .enumerate()
            .map(|(group, ids)| {
                ids.into_iter()
                    .enumerate()
                    .map(|(index, id)| QueryMatch {
                        id,
                        distance: cell(&distances, group, index).unwrap_or_default(),
                        text: cell(&documents, group, index),
                        metadata: metadata_from_json(cell(&metadatas, group, index)),
                    })
                    .collect()
            })
            .collect())
    }

    async fn delete(&self, ids: &[String]) -> VectorResult<()> {
        send(
            self.http
                .post(format!("{}/delete", self.url))
                .json(&DeleteRequest { ids }),
            "delete documents",
        )
        .await?;
        Ok(())
    }

    async fn count(&self) -> VectorResult<u64> {
        send_json(
            self.http.get(format!("{}/count", self.url)),
            "count documents",
        )
        .await
    }
}
