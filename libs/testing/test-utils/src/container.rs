//! Chroma container test infrastructure
//!
//! Provides a `TestChroma` helper that runs a real Chroma server for testing.

use std::time::Duration;

use testcontainers::core::IntoContainerPort;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};

const CHROMA_IMAGE: &str = "chromadb/chroma";
const CHROMA_TAG: &str = "1.0.20";
const CHROMA_PORT: u16 = 8000;

/// Test Chroma wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is dropped.
///
/// # Example
///
/// ```no_run
/// use test_utils::TestChroma;
///
/// # async fn example() {
/// let chroma = TestChroma::new().await;
/// // Point the client at chroma.url()
/// # }
/// ```
pub struct TestChroma {
    #[allow(dead_code)]
    container: ContainerAsync<GenericImage>,
    pub url: String,
}

impl TestChroma {
    /// Start a Chroma container and wait until its heartbeat answers
    pub async fn new() -> Self {
        let container = GenericImage::new(CHROMA_IMAGE, CHROMA_TAG)
            .with_exposed_port(CHROMA_PORT.tcp())
            .start()
            .await
            .expect("Failed to start Chroma container");

        let host_port = container
            .get_host_port_ipv4(CHROMA_PORT)
            .await
            .expect("Failed to get Chroma port");

        let url = format!("http://127.0.0.1:{}", host_port);
        wait_for_heartbeat(&url).await;

        tracing::info!(port = host_port, "Test Chroma ready ({}:{})", CHROMA_IMAGE, CHROMA_TAG);

        Self { container, url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

async fn wait_for_heartbeat(url: &str) {
    let client = reqwest::Client::new();
    let heartbeat = format!("{}/api/v2/heartbeat", url);

    for _ in 0..60 {
        if let Ok(response) = client.get(&heartbeat).send().await {
            if response.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    panic!("Chroma container did not become healthy at {}", url);
}

// Container is automatically cleaned up when TestChroma is dropped
impl Drop for TestChroma {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test Chroma container");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_chroma_container_heartbeat() {
        let chroma = TestChroma::new().await;

        let response = reqwest::get(format!("{}/api/v2/heartbeat", chroma.url()))
            .await
            .unwrap();
        assert!(response.status().is_success());
    }
}
