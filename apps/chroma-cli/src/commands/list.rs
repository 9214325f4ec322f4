use std::io::Write;

use domain_vector::{Page, VectorError};
use eyre::{Result, WrapErr};

use super::{cancellable, finish, open_session};
use crate::cli::ListArgs;
use crate::config::AppConfig;
use crate::render::Reporter;
use crate::shutdown::CancelToken;

/// Print one page of documents followed by the collection total
pub async fn list<W: Write>(
    args: &ListArgs,
    config: &AppConfig,
    mut cancel: CancelToken,
    out: &mut Reporter<W>,
) -> Result<()> {
    let mut session = open_session(config, &mut cancel).await?;

    let page = Page::new(args.limit, args.offset);
    let outcome = cancellable(&mut cancel, async {
        let collection = session.collection()?;
        let documents = collection.get(page).await?;
        let total = collection.count().await?;
        Ok::<_, VectorError>((documents, total))
    })
    .await
    .wrap_err("failed to list documents")
    .and_then(|(documents, total)| {
        out.documents(page.offset, &documents, total)
            .wrap_err("failed to write output")
    });

    finish(&mut session, outcome).await
}
