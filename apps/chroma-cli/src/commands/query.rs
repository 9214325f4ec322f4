use std::io::Write;

use eyre::{Result, WrapErr};
use tracing::info;

use super::{cancellable, finish, open_session};
use crate::cli::QueryArgs;
use crate::config::AppConfig;
use crate::render::Reporter;
use crate::shutdown::CancelToken;

/// Nearest-neighbour search for each query text
pub async fn query<W: Write>(
    args: &QueryArgs,
    config: &AppConfig,
    mut cancel: CancelToken,
    out: &mut Reporter<W>,
) -> Result<()> {
    let mut session = open_session(config, &mut cancel).await?;

    for text in &args.queries {
        info!(query = %text, "querying collection");
    }
    let outcome = cancellable(&mut cancel, async {
        session
            .collection()?
            .query(&args.queries, args.results)
            .await
    })
    .await
    .wrap_err("failed to query collection")
    .and_then(|groups| {
        if groups.iter().all(Vec::is_empty) {
            info!("no results found");
            return Ok(());
        }
        out.query_results(&args.queries, &groups)
            .wrap_err("failed to write output")
    });

    finish(&mut session, outcome).await
}
