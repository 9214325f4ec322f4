use eyre::{Result, WrapErr};
use tracing::info;

use super::{cancellable, finish, open_session};
use crate::cli::DeleteArgs;
use crate::config::AppConfig;
use crate::shutdown::CancelToken;

/// Delete one document by id; unknown ids are not an error
pub async fn delete(args: &DeleteArgs, config: &AppConfig, mut cancel: CancelToken) -> Result<()> {
    let mut session = open_session(config, &mut cancel).await?;

    info!(id = %args.id, "deleting document");
    let ids = [args.id.clone()];
    let outcome = cancellable(&mut cancel, async {
        session.collection()?.delete(&ids).await
    })
    .await
    .wrap_err_with(|| format!("failed to delete document {}", args.id));

    finish(&mut session, outcome).await?;
    info!(id = %args.id, "document deleted");
    Ok(())
}
