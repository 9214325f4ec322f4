//! Shared test utilities for vector store testing
//!
//! This crate provides reusable test infrastructure:
//! - `FakeChroma`: in-process fake of the Chroma v2 REST API (always available)
//! - `TestChroma`: real Chroma container with automatic cleanup (feature: "container")
//! - `TestDataBuilder`: Deterministic test data generation (always available)
//! - `assertions`: Custom assertion helpers (always available)
//!
//! # Features
//!
//! - `container`: Enables the Docker-backed Chroma server
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::{FakeChroma, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_vector_test() {
//!     let chroma = FakeChroma::start().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!
//!     let fixture = builder.yaml_documents(3);
//!     let id = builder.document_id(1);
//! }
//! ```
//!
//! ## Container Testing
//!
//! Add `features = ["container"]` to your dev-dependencies:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { workspace = true, features = ["container"] }
//! ```

mod fake_chroma;

#[cfg(feature = "container")]
mod container;

pub use fake_chroma::FakeChroma;

#[cfg(feature = "container")]
pub use container::TestChroma;

const TOPICS: [&str; 4] = ["ai", "databases", "systems", "cooking"];

const TEXTS: [&str; 4] = [
    "Neural networks learn layered representations of their input.",
    "A vector database indexes embeddings for nearest-neighbour search.",
    "Rust guarantees memory safety without a garbage collector.",
    "Slow-roasted tomatoes make a rich pasta sauce.",
];

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_add_documents");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Document id for the `n`th fixture document (1-based)
    pub fn document_id(&self, n: usize) -> String {
        format!("doc-{}-{}", self.seed % 100_000, n)
    }

    /// Fixture text for the `n`th document; cycles through a small corpus
    pub fn text(&self, n: usize) -> &'static str {
        TEXTS[(n.saturating_sub(1)) % TEXTS.len()]
    }

    pub fn topic(&self, n: usize) -> &'static str {
        TOPICS[(n.saturating_sub(1)) % TOPICS.len()]
    }

    /// YAML stream of `count` documents, each with `topic` and `seq` metadata
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let yaml = TestDataBuilder::new(7).yaml_documents(2);
    /// assert_eq!(yaml.matches("---").count(), 1);
    /// ```
    pub fn yaml_documents(&self, count: usize) -> String {
        (1..=count)
            .map(|n| {
                format!(
                    "id: {}\ntext: {}\nmetadata:\n  topic: {}\n  seq: \"{}\"\n",
                    self.document_id(n),
                    self.text(n),
                    self.topic(n),
                    n
                )
            })
            .collect::<Vec<_>>()
            .join("---\n")
    }
}

/// Test assertion helpers
pub mod assertions {
    /// Assert that distances come back nearest-first
    pub fn assert_ascending(distances: &[f32], context: &str) {
        for pair in distances.windows(2) {
            assert!(
                pair[0] <= pair[1],
                "{}: distances not ascending: {:?}",
                context,
                distances
            );
        }
    }

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}
