use domain_vector::{AddMode, load_documents};
use eyre::{Result, WrapErr, bail};
use tracing::info;

use super::{cancellable, finish, open_session};
use crate::cli::AddArgs;
use crate::config::AppConfig;
use crate::shutdown::CancelToken;

/// Load a YAML file and submit every document in one batch
pub async fn add(args: &AddArgs, config: &AppConfig, mut cancel: CancelToken) -> Result<()> {
    let documents = load_documents(&args.file)
        .wrap_err_with(|| format!("failed to load documents from {}", args.file.display()))?;
    if documents.is_empty() {
        bail!("no documents found in {}", args.file.display());
    }

    let mode = if args.upsert {
        AddMode::Upsert
    } else {
        AddMode::Insert
    };

    let mut session = open_session(config, &mut cancel).await?;

    info!(count = documents.len(), file = %args.file.display(), "adding documents");
    let outcome = cancellable(&mut cancel, async {
        let collection = session.collection()?;
        collection.add(&documents, mode).await?;
        collection.count().await
    })
    .await
    .wrap_err("failed to add documents");

    let total = finish(&mut session, outcome).await?;
    info!(added = documents.len(), total, "documents added");
    Ok(())
}
