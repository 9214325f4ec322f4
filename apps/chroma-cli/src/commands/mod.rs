//! Command handlers
//!
//! Each invocation runs Init → SessionOpen → Execute → Render → Close. The
//! session is closed whether the command succeeded, failed or was cancelled.

mod add;
mod delete;
mod list;
mod query;

use std::future::Future;
use std::io::Write;

use domain_vector::{Session, VectorError, VectorResult};
use eyre::{Result, WrapErr};
use tracing::warn;

use crate::cli::Command;
use crate::config::AppConfig;
use crate::render::Reporter;
use crate::shutdown::CancelToken;

pub use add::add;
pub use delete::delete;
pub use list::list;
pub use query::query;

/// Dispatch a parsed subcommand
pub async fn execute<W: Write>(
    command: &Command,
    config: &AppConfig,
    cancel: CancelToken,
    out: &mut Reporter<W>,
) -> Result<()> {
    match command {
        Command::Add(args) => add(args, config, cancel).await,
        Command::List(args) => list(args, config, cancel, out).await,
        Command::Query(args) => query(args, config, cancel, out).await,
        Command::Delete(args) => delete(args, config, cancel).await,
    }
}

/// Race `work` against cancellation
async fn cancellable<T>(
    cancel: &mut CancelToken,
    work: impl Future<Output = VectorResult<T>>,
) -> VectorResult<T> {
    tokio::select! {
        result = work => result,
        _ = cancel.cancelled() => Err(VectorError::Cancelled),
    }
}

async fn open_session(config: &AppConfig, cancel: &mut CancelToken) -> Result<Session> {
    cancellable(cancel, Session::open(&config.session))
        .await
        .wrap_err_with(|| format!("failed to open session at {}", config.session.server.url))
}

/// Close the session, then hand back the command outcome.
///
/// A close failure only surfaces when the command itself succeeded.
async fn finish<T>(session: &mut Session, outcome: Result<T>) -> Result<T> {
    match (session.close().await, outcome) {
        (Ok(()), outcome) => outcome,
        (Err(e), Ok(_)) => Err(e).wrap_err("failed to close session"),
        (Err(e), Err(report)) => {
            warn!(error = %e, "failed to close session");
            Err(report)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use domain_vector::{
        AddMode, Collection, CollectionSpec, DistanceMetric, Document, EmbeddingConfig,
        EmbeddingProvider, Page, QueryMatch, StoredDocument, VectorClient,
    };
    use mockall::mock;

    use super::*;

    mock! {
        Client {}

        #[async_trait]
        impl VectorClient for Client {
            async fn heartbeat(&self) -> VectorResult<()>;
            async fn get_or_create_collection(
                &self,
                spec: &CollectionSpec,
                embedder: Arc<dyn EmbeddingProvider>,
            ) -> VectorResult<Box<dyn Collection>>;
            async fn close(&self) -> VectorResult<()>;
        }
    }

    mock! {
        Store {}

        #[async_trait]
        impl Collection for Store {
            async fn add(&self, documents: &[Document], mode: AddMode) -> VectorResult<()>;
            async fn get(&self, page: Page) -> VectorResult<Vec<StoredDocument>>;
            async fn query(
                &self,
                texts: &[String],
                n_results: u32,
            ) -> VectorResult<Vec<Vec<QueryMatch>>>;
            async fn delete(&self, ids: &[String]) -> VectorResult<()>;
            async fn count(&self) -> VectorResult<u64>;
        }
    }

    /// Open a session whose client must be closed exactly once
    async fn session_closing_with(close: VectorResult<()>) -> Session {
        let mut client = MockClient::new();
        client.expect_heartbeat().returning(|| Ok(()));
        client
            .expect_get_or_create_collection()
            .returning(|_, _| Ok(Box::new(MockStore::new()) as Box<dyn Collection>));
        let mut close = Some(close);
        client
            .expect_close()
            .times(1)
            .returning(move || close.take().unwrap_or(Ok(())));

        Session::open_with(Box::new(client), &EmbeddingConfig::Hash, DistanceMetric::L2)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_finish_closes_session_on_success() {
        let mut session = session_closing_with(Ok(())).await;

        let value = finish(&mut session, Ok(7)).await.unwrap();

        assert_eq!(value, 7);
        assert!(!session.is_open());
    }

    #[tokio::test]
    async fn test_finish_closes_session_on_command_error() {
        let mut session = session_closing_with(Ok(())).await;

        let err = finish::<()>(&mut session, Err(eyre::eyre!("failed to list documents")))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "failed to list documents");
        assert!(!session.is_open());
    }

    #[tokio::test]
    async fn test_finish_keeps_command_error_when_close_fails() {
        let mut session =
            session_closing_with(Err(VectorError::remote("close", "socket hung up"))).await;

        let err = finish::<()>(&mut session, Err(VectorError::Cancelled.into()))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<VectorError>(),
            Some(VectorError::Cancelled)
        ));
        assert!(!session.is_open());
    }

    #[tokio::test]
    async fn test_finish_surfaces_close_failure_after_success() {
        let mut session =
            session_closing_with(Err(VectorError::remote("close", "socket hung up"))).await;

        let err = finish(&mut session, Ok(())).await.unwrap_err();

        assert_eq!(err.to_string(), "failed to close session");
        assert!(matches!(
            err.downcast_ref::<VectorError>(),
            Some(VectorError::Remote { .. })
        ));
        assert!(!session.is_open());
    }
}
