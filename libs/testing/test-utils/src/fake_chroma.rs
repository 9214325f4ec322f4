//! In-process fake of the Chroma v2 REST API
//!
//! Implements the subset of routes the vector domain talks to, backed by an
//! in-memory store with brute-force nearest-neighbour search. Good enough to
//! exercise the real HTTP client without Docker.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

type ApiResult = Result<Response, ApiError>;

struct ApiError {
    status: StatusCode,
    error: &'static str,
    message: String,
}

impl ApiError {
    fn bad_request(error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: "NotFoundError",
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": self.error, "message": self.message })),
        )
            .into_response()
    }
}

#[derive(Debug, Clone)]
struct Record {
    id: String,
    embedding: Vec<f32>,
    document: Option<String>,
    metadata: Option<Value>,
}

#[derive(Debug)]
struct FakeCollection {
    id: String,
    name: String,
    tenant: String,
    database: String,
    metadata: Map<String, Value>,
    records: Vec<Record>,
}

impl FakeCollection {
    fn space(&self) -> &str {
        self.metadata
            .get("hnsw:space")
            .and_then(Value::as_str)
            .unwrap_or("l2")
    }

    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        match self.space() {
            "cosine" => {
                let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    1.0
                } else {
                    1.0 - dot / (norm_a * norm_b)
                }
            }
            "ip" => 1.0 - dot,
            _ => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum(),
        }
    }
}

#[derive(Default)]
struct FakeState {
    healthy: AtomicBool,
    next_id: AtomicU64,
    collections: Mutex<Vec<FakeCollection>>,
}

impl FakeState {
    fn with_collection<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut FakeCollection) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        let collection = collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ApiError::not_found(format!("Collection [{}] does not exist", id)))?;
        f(collection)
    }
}

// ===== Request bodies =====

#[derive(Deserialize)]
struct CreateCollection {
    name: String,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
    #[serde(default)]
    get_or_create: bool,
}

#[derive(Deserialize)]
struct AddRecords {
    ids: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    #[serde(default)]
    documents: Option<Vec<Option<String>>>,
    #[serde(default)]
    metadatas: Option<Vec<Option<Value>>>,
}

#[derive(Deserialize)]
struct GetRecords {
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    offset: Option<usize>,
}

#[derive(Deserialize)]
struct QueryRecords {
    query_embeddings: Vec<Vec<f32>>,
    #[serde(default = "default_n_results")]
    n_results: usize,
}

fn default_n_results() -> usize {
    10
}

#[derive(Deserialize)]
struct DeleteRecords {
    #[serde(default)]
    ids: Vec<String>,
}

// ===== Handlers =====

async fn heartbeat(State(state): State<Arc<FakeState>>) -> ApiResult {
    if !state.healthy.load(Ordering::SeqCst) {
        return Err(ApiError {
            status: StatusCode::SERVICE_UNAVAILABLE,
            error: "Unavailable",
            message: "server is not ready".to_string(),
        });
    }
    Ok(Json(json!({ "nanosecond heartbeat": 1 })).into_response())
}

async fn create_collection(
    State(state): State<Arc<FakeState>>,
    Path((tenant, database)): Path<(String, String)>,
    Json(body): Json<CreateCollection>,
) -> ApiResult {
    let mut collections = state.collections.lock().unwrap_or_else(|e| e.into_inner());

    if let Some(existing) = collections
        .iter()
        .find(|c| c.name == body.name && c.tenant == tenant && c.database == database)
    {
        if !body.get_or_create {
            return Err(ApiError {
                status: StatusCode::CONFLICT,
                error: "UniqueConstraintError",
                message: format!("Collection [{}] already exists", body.name),
            });
        }
        return Ok(Json(json!({ "id": existing.id, "name": existing.name })).into_response());
    }

    let id = format!(
        "00000000-0000-0000-0000-{:012}",
        state.next_id.fetch_add(1, Ordering::SeqCst) + 1
    );
    collections.push(FakeCollection {
        id: id.clone(),
        name: body.name.clone(),
        tenant,
        database,
        metadata: body.metadata.unwrap_or_default(),
        records: Vec::new(),
    });

    Ok(Json(json!({ "id": id, "name": body.name })).into_response())
}

fn validate_add(collection: &FakeCollection, body: &AddRecords) -> Result<(), ApiError> {
    let n = body.ids.len();
    let lengths_match = body.embeddings.len() == n
        && body.documents.as_ref().is_none_or(|d| d.len() == n)
        && body.metadatas.as_ref().is_none_or(|m| m.len() == n);
    if !lengths_match {
        return Err(ApiError::bad_request(
            "InvalidArgumentError",
            "Inconsistent number of ids, embeddings, documents and metadatas",
        ));
    }

    for (i, id) in body.ids.iter().enumerate() {
        if body.ids[..i].contains(id) {
            return Err(ApiError::bad_request(
                "DuplicateIDError",
                format!("Expected IDs to be unique, found duplicates of: {}", id),
            ));
        }
    }

    let expected = collection
        .records
        .first()
        .map(|r| r.embedding.len())
        .or_else(|| body.embeddings.first().map(Vec::len));
    let mismatch = expected.and_then(|expected| {
        body.embeddings
            .iter()
            .find(|e| e.len() != expected)
            .map(|bad| (expected, bad))
    });
    if let Some((expected, bad)) = mismatch {
        return Err(ApiError::bad_request(
            "InvalidArgumentError",
            format!(
                "Collection expecting embedding with dimension of {}, got {}",
                expected,
                bad.len()
            ),
        ));
    }
    Ok(())
}

fn write_records(collection: &mut FakeCollection, body: AddRecords, overwrite: bool) {
    let documents = body.documents.unwrap_or_default();
    let metadatas = body.metadatas.unwrap_or_default();

    for (i, (id, embedding)) in body.ids.into_iter().zip(body.embeddings).enumerate() {
        let record = Record {
            id,
            embedding,
            document: documents.get(i).cloned().flatten(),
            metadata: metadatas.get(i).cloned().flatten(),
        };
        match collection.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) if overwrite => *existing = record,
            // Plain add keeps the existing record
            Some(_) => {}
            None => collection.records.push(record),
        }
    }
}

async fn add_records(
    State(state): State<Arc<FakeState>>,
    Path((_tenant, _database, id)): Path<(String, String, String)>,
    Json(body): Json<AddRecords>,
) -> ApiResult {
    state.with_collection(&id, |collection| {
        validate_add(collection, &body)?;
        write_records(collection, body, false);
        Ok(StatusCode::CREATED.into_response())
    })
}

async fn upsert_records(
    State(state): State<Arc<FakeState>>,
    Path((_tenant, _database, id)): Path<(String, String, String)>,
    Json(body): Json<AddRecords>,
) -> ApiResult {
    state.with_collection(&id, |collection| {
        validate_add(collection, &body)?;
        write_records(collection, body, true);
        Ok(Json(json!({})).into_response())
    })
}

async fn get_records(
    State(state): State<Arc<FakeState>>,
    Path((_tenant, _database, id)): Path<(String, String, String)>,
    Json(body): Json<GetRecords>,
) -> ApiResult {
    state.with_collection(&id, |collection| {
        let page: Vec<&Record> = collection
            .records
            .iter()
            .skip(body.offset.unwrap_or(0))
            .take(body.limit.unwrap_or(usize::MAX))
            .collect();

        Ok(Json(json!({
            "ids": page.iter().map(|r| &r.id).collect::<Vec<_>>(),
            "documents": page.iter().map(|r| &r.document).collect::<Vec<_>>(),
            "metadatas": page.iter().map(|r| &r.metadata).collect::<Vec<_>>(),
            "embeddings": null,
            "include": ["documents", "metadatas"],
        }))
        .into_response())
    })
}

async fn query_records(
    State(state): State<Arc<FakeState>>,
    Path((_tenant, _database, id)): Path<(String, String, String)>,
    Json(body): Json<QueryRecords>,
) -> ApiResult {
    state.with_collection(&id, |collection| {
        let mut ids = Vec::new();
        let mut documents = Vec::new();
        let mut metadatas = Vec::new();
        let mut distances = Vec::new();

        for query in &body.query_embeddings {
            let mut scored: Vec<(f32, &Record)> = collection
                .records
                .iter()
                .map(|r| (collection.distance(query, &r.embedding), r))
                .collect();
            scored.sort_by(|a, b| a.0.total_cmp(&b.0));
            scored.truncate(body.n_results);

            ids.push(scored.iter().map(|(_, r)| &r.id).collect::<Vec<_>>());
            documents.push(scored.iter().map(|(_, r)| &r.document).collect::<Vec<_>>());
            metadatas.push(scored.iter().map(|(_, r)| &r.metadata).collect::<Vec<_>>());
            distances.push(scored.iter().map(|(d, _)| *d).collect::<Vec<_>>());
        }

        Ok(Json(json!({
            "ids": ids,
            "documents": documents,
            "metadatas": metadatas,
            "distances": distances,
            "embeddings": null,
            "include": ["documents", "metadatas", "distances"],
        }))
        .into_response())
    })
}

async fn delete_records(
    State(state): State<Arc<FakeState>>,
    Path((_tenant, _database, id)): Path<(String, String, String)>,
    Json(body): Json<DeleteRecords>,
) -> ApiResult {
    state.with_collection(&id, |collection| {
        collection.records.retain(|r| !body.ids.contains(&r.id));
        Ok(Json(json!({})).into_response())
    })
}

async fn count_records(
    State(state): State<Arc<FakeState>>,
    Path((_tenant, _database, id)): Path<(String, String, String)>,
) -> ApiResult {
    state.with_collection(&id, |collection| {
        Ok(Json(json!(collection.records.len())).into_response())
    })
}

fn router(state: Arc<FakeState>) -> Router {
    const DB: &str = "/api/v2/tenants/{tenant}/databases/{database}";
    Router::new()
        .route("/api/v2/heartbeat", get(heartbeat))
        .route(&format!("{DB}/collections"), post(create_collection))
        .route(&format!("{DB}/collections/{{id}}/add"), post(add_records))
        .route(&format!("{DB}/collections/{{id}}/upsert"), post(upsert_records))
        .route(&format!("{DB}/collections/{{id}}/get"), post(get_records))
        .route(&format!("{DB}/collections/{{id}}/query"), post(query_records))
        .route(&format!("{DB}/collections/{{id}}/delete"), post(delete_records))
        .route(&format!("{DB}/collections/{{id}}/count"), get(count_records))
        .with_state(state)
}

/// Fake Chroma server bound to an ephemeral localhost port
///
/// The server task is aborted when this struct is dropped.
///
/// # Example
///
/// ```no_run
/// use test_utils::FakeChroma;
///
/// # async fn example() {
/// let chroma = FakeChroma::start().await;
/// // Point the client at chroma.url()
/// assert_eq!(chroma.document_count("example_collection"), 0);
/// # }
/// ```
pub struct FakeChroma {
    url: String,
    state: Arc<FakeState>,
    handle: JoinHandle<()>,
}

impl FakeChroma {
    /// Start a healthy server
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        state.healthy.store(true, Ordering::SeqCst);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Chroma server");
        let addr = listener
            .local_addr()
            .expect("Failed to read fake Chroma address");

        let app = router(state.clone());
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "fake Chroma server failed");
            }
        });

        tracing::debug!(%addr, "Fake Chroma ready");

        Self {
            url: format!("http://{}", addr),
            state,
            handle,
        }
    }

    /// Start a server whose heartbeat fails
    pub async fn unhealthy() -> Self {
        let chroma = Self::start().await;
        chroma.set_healthy(false);
        chroma
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.state.healthy.store(healthy, Ordering::SeqCst);
    }

    fn inspect<T>(&self, name: &str, f: impl FnOnce(&FakeCollection) -> T) -> Option<T> {
        let collections = self
            .state
            .collections
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        collections.iter().find(|c| c.name == name).map(f)
    }

    /// Metadata the collection was created with, if it exists
    pub fn collection_metadata(&self, name: &str) -> Option<Map<String, Value>> {
        self.inspect(name, |c| c.metadata.clone())
    }

    /// `(tenant, database)` the collection was created under
    pub fn collection_location(&self, name: &str) -> Option<(String, String)> {
        self.inspect(name, |c| (c.tenant.clone(), c.database.clone()))
    }

    /// Stored ids in insertion order; empty if the collection does not exist
    pub fn document_ids(&self, name: &str) -> Vec<String> {
        self.inspect(name, |c| c.records.iter().map(|r| r.id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn document_count(&self, name: &str) -> usize {
        self.inspect(name, |c| c.records.len()).unwrap_or(0)
    }

    /// Stored document text by id
    pub fn document_text(&self, name: &str, id: &str) -> Option<String> {
        self.inspect(name, |c| {
            c.records
                .iter()
                .find(|r| r.id == id)
                .and_then(|r| r.document.clone())
        })
        .flatten()
    }

    /// Stored metadata by id, exactly as sent by the client
    pub fn document_metadata(&self, name: &str, id: &str) -> Option<Value> {
        self.inspect(name, |c| {
            c.records
                .iter()
                .find(|r| r.id == id)
                .and_then(|r| r.metadata.clone())
        })
        .flatten()
    }
}

impl Drop for FakeChroma {
    fn drop(&mut self) {
        tracing::debug!("Shutting down fake Chroma server");
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(space: &str) -> FakeCollection {
        let mut metadata = Map::new();
        metadata.insert("hnsw:space".to_string(), json!(space));
        FakeCollection {
            id: "c1".to_string(),
            name: "test".to_string(),
            tenant: "default_tenant".to_string(),
            database: "default_database".to_string(),
            metadata,
            records: Vec::new(),
        }
    }

    #[test]
    fn test_distance_functions() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];

        assert_eq!(collection("l2").distance(&a, &b), 2.0);
        assert_eq!(collection("cosine").distance(&a, &b), 1.0);
        assert_eq!(collection("cosine").distance(&a, &a), 0.0);
        assert_eq!(collection("ip").distance(&a, &a), 0.0);
    }

    #[test]
    fn test_upsert_overwrites_but_add_keeps_existing() {
        let mut c = collection("l2");
        let body = |text: &str| AddRecords {
            ids: vec!["a".to_string()],
            embeddings: vec![vec![0.0, 1.0]],
            documents: Some(vec![Some(text.to_string())]),
            metadatas: None,
        };

        write_records(&mut c, body("first"), false);
        write_records(&mut c, body("second"), false);
        assert_eq!(c.records[0].document.as_deref(), Some("first"));

        write_records(&mut c, body("third"), true);
        assert_eq!(c.records.len(), 1);
        assert_eq!(c.records[0].document.as_deref(), Some("third"));
    }

    #[test]
    fn test_validate_add_rejects_duplicates_and_dimension_mismatch() {
        let c = collection("l2");
        let duplicates = AddRecords {
            ids: vec!["a".to_string(), "a".to_string()],
            embeddings: vec![vec![0.0], vec![1.0]],
            documents: None,
            metadatas: None,
        };
        assert!(validate_add(&c, &duplicates).is_err());

        let ragged = AddRecords {
            ids: vec!["a".to_string(), "b".to_string()],
            embeddings: vec![vec![0.0], vec![1.0, 2.0]],
            documents: None,
            metadatas: None,
        };
        assert!(validate_add(&c, &ragged).is_err());
    }

    #[tokio::test]
    async fn test_unhealthy_server_starts_and_reports_url() {
        let chroma = FakeChroma::unhealthy().await;
        assert!(chroma.url().starts_with("http://127.0.0.1:"));
        assert_eq!(chroma.document_count("missing"), 0);
        assert!(chroma.collection_metadata("missing").is_none());
    }
}
