use tracing::{debug, info, warn};

use crate::chroma::{ChromaClient, ChromaConfig};
use crate::embedding::{EmbeddingConfig, select_embedding};
use crate::error::{VectorError, VectorResult};
use crate::models::{COLLECTION_NAME, CollectionSpec, DistanceMetric};
use crate::store::{Collection, VectorClient};

/// Everything needed to open a session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub server: ChromaConfig,
    pub embedding: EmbeddingConfig,
    pub distance: DistanceMetric,
}

/// An open client plus the resolved working collection.
///
/// Both halves are present between a successful `open` and `close`.
pub struct Session {
    client: Option<Box<dyn VectorClient>>,
    collection: Option<Box<dyn Collection>>,
}

impl Session {
    /// Connect to the configured server and resolve the working collection
    pub async fn open(config: &SessionConfig) -> VectorResult<Self> {
        info!(url = %config.server.url, "connecting to vector store");
        let client = ChromaClient::new(config.server.clone())?;
        Self::open_with(Box::new(client), &config.embedding, config.distance).await
    }

    /// Open a session over an already-built client.
    ///
    /// On any failure the client is closed before the error is returned.
    pub async fn open_with(
        client: Box<dyn VectorClient>,
        embedding: &EmbeddingConfig,
        distance: DistanceMetric,
    ) -> VectorResult<Self> {
        if let Err(e) = client.heartbeat().await {
            close_quietly(client.as_ref()).await;
            return Err(VectorError::Connection(format!(
                "vector store is not reachable: {}",
                e
            )));
        }
        info!("connected to vector store");

        let embedder = match select_embedding(embedding) {
            Ok(embedder) => embedder,
            Err(e) => {
                close_quietly(client.as_ref()).await;
                return Err(e);
            }
        };

        let spec = CollectionSpec::new(COLLECTION_NAME, distance);
        info!(name = %spec.name, distance = %spec.distance, "creating collection");

        let collection = match client.get_or_create_collection(&spec, embedder).await {
            Ok(collection) => collection,
            Err(e) => {
                close_quietly(client.as_ref()).await;
                return Err(match e {
                    remote @ VectorError::Remote { .. } => remote,
                    other => VectorError::remote("get or create collection", other.to_string()),
                });
            }
        };
        info!(name = %spec.name, "collection ready");

        Ok(Self {
            client: Some(client),
            collection: Some(collection),
        })
    }

    /// The working collection; fails once the session is closed
    pub fn collection(&self) -> VectorResult<&dyn Collection> {
        self.collection
            .as_deref()
            .ok_or_else(|| VectorError::config("session is closed"))
    }

    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }

    /// Release the collection handle and the client. Safe to call repeatedly.
    pub async fn close(&mut self) -> VectorResult<()> {
        self.collection = None;
        match self.client.take() {
            Some(client) => {
                debug!("closing session");
                client.close().await
            }
            None => Ok(()),
        }
    }
}

async fn close_quietly(client: &dyn VectorClient) {
    if let Err(e) = client.close().await {
        warn!(error = %e, "failed to close vector store client");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Page;
    use crate::store::{MockCollection, MockVectorClient};

    fn healthy_client() -> MockVectorClient {
        let mut client = MockVectorClient::new();
        client.expect_heartbeat().returning(|| Ok(()));
        client
    }

    #[tokio::test]
    async fn test_open_resolves_example_collection() {
        let mut client = healthy_client();
        client
            .expect_get_or_create_collection()
            .withf(|spec, embedder| {
                spec.name == COLLECTION_NAME
                    && spec.distance == DistanceMetric::Cosine
                    && embedder.name() == "hash"
            })
            .times(1)
            .returning(|_, _| {
                let mut collection = MockCollection::new();
                collection.expect_get().returning(|_| Ok(vec![]));
                Ok(Box::new(collection) as Box<dyn Collection>)
            });
        client.expect_close().times(1).returning(|| Ok(()));

        let mut session = Session::open_with(
            Box::new(client),
            &EmbeddingConfig::Hash,
            DistanceMetric::Cosine,
        )
        .await
        .unwrap();

        assert!(session.is_open());
        let docs = session
            .collection()
            .unwrap()
            .get(Page::default())
            .await
            .unwrap();
        assert!(docs.is_empty());
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_heartbeat_failure_is_connection_error_and_closes() {
        let mut client = MockVectorClient::new();
        client
            .expect_heartbeat()
            .returning(|| Err(VectorError::remote("heartbeat", "connection refused")));
        client.expect_get_or_create_collection().never();
        client.expect_close().times(1).returning(|| Ok(()));

        let err = Session::open_with(
            Box::new(client),
            &EmbeddingConfig::Hash,
            DistanceMetric::L2,
        )
        .await
        .err()
        .unwrap();

        assert!(
            matches!(err, VectorError::Connection(ref msg) if msg.contains("connection refused"))
        );
    }

    #[tokio::test]
    async fn test_embedding_failure_closes_client() {
        let mut client = healthy_client();
        client.expect_get_or_create_collection().never();
        client.expect_close().times(1).returning(|| Ok(()));

        let embedding = EmbeddingConfig::Gemini {
            api_key: None,
            model: crate::embedding::DEFAULT_GEMINI_MODEL.to_string(),
        };
        let err = Session::open_with(Box::new(client), &embedding, DistanceMetric::L2)
            .await
            .err()
            .unwrap();

        assert!(matches!(err, VectorError::Config(ref msg) if msg.contains("GEMINI_API_KEY")));
    }

    #[tokio::test]
    async fn test_collection_failure_is_remote_error_and_closes() {
        let mut client = healthy_client();
        client
            .expect_get_or_create_collection()
            .returning(|_, _| Err(VectorError::Connection("reset by peer".into())));
        client.expect_close().times(1).returning(|| Ok(()));

        let err = Session::open_with(
            Box::new(client),
            &EmbeddingConfig::Hash,
            DistanceMetric::InnerProduct,
        )
        .await
        .err()
        .unwrap();

        match err {
            VectorError::Remote { operation, message } => {
                assert_eq!(operation, "get or create collection");
                assert!(message.contains("reset by peer"));
            }
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut client = healthy_client();
        client
            .expect_get_or_create_collection()
            .returning(|_, _| Ok(Box::new(MockCollection::new()) as Box<dyn Collection>));
        client.expect_close().times(1).returning(|| Ok(()));

        let mut session = Session::open_with(
            Box::new(client),
            &EmbeddingConfig::Hash,
            DistanceMetric::L2,
        )
        .await
        .unwrap();

        session.close().await.unwrap();
        session.close().await.unwrap();

        assert!(!session.is_open());
        assert!(matches!(session.collection(), Err(VectorError::Config(_))));
    }

    #[tokio::test]
    async fn test_close_without_client_is_noop() {
        let mut session = Session {
            client: None,
            collection: None,
        };
        session.close().await.unwrap();
        assert!(matches!(session.collection(), Err(VectorError::Config(_))));
    }

    #[tokio::test]
    async fn test_open_rejects_invalid_server_url() {
        let config = SessionConfig {
            server: ChromaConfig::new("::not-a-url::"),
            embedding: EmbeddingConfig::Hash,
            distance: DistanceMetric::L2,
        };
        let err = Session::open(&config).await.err().unwrap();
        assert!(matches!(err, VectorError::Config(_)));
    }
}
