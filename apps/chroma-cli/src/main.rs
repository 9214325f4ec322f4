//! Chroma CLI - Entry Point

use std::process::ExitCode;

use domain_vector::VectorError;
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match chroma_cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            let chain = report
                .chain()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(": ");
            let kind = report
                .chain()
                .find_map(|cause| cause.downcast_ref::<VectorError>())
                .map_or("other", VectorError::kind);

            error!(error = %chain, kind, "command failed");
            ExitCode::FAILURE
        }
    }
}
