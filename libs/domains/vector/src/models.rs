use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VectorError;

/// Name of the single collection every command operates on
pub const COLLECTION_NAME: &str = "example_collection";

/// Description attribute stored on the collection at creation time
pub const COLLECTION_DESCRIPTION: &str = "An example collection for testing";

pub type Metadata = BTreeMap<String, String>;

/// A document read from an input file, ready to be submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A document as returned by the server
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoredDocument {
    pub id: String,
    pub text: Option<String>,
    pub metadata: Metadata,
}

/// One nearest-neighbour hit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryMatch {
    pub id: String,
    pub distance: f32,
    pub text: Option<String>,
    pub metadata: Metadata,
}

/// Distance metric for similarity calculations, fixed when the collection is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    /// Squared Euclidean distance
    #[default]
    L2,
    Cosine,
    InnerProduct,
}

impl DistanceMetric {
    /// Server-side name of the metric (`hnsw:space`)
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::L2 => "l2",
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::InnerProduct => "ip",
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = VectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "l2" => Ok(DistanceMetric::L2),
            "cosine" => Ok(DistanceMetric::Cosine),
            "ip" => Ok(DistanceMetric::InnerProduct),
            other => Err(VectorError::Config(format!(
                "unknown distance function '{}' (expected 'l2', 'cosine' or 'ip')",
                other
            ))),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a distance metric name; case-sensitive
pub fn parse_distance_metric(s: &str) -> Result<DistanceMetric, VectorError> {
    s.parse()
}

/// Get-or-create request for a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSpec {
    pub name: String,
    pub description: String,
    pub distance: DistanceMetric,
}

impl CollectionSpec {
    pub fn new(name: impl Into<String>, distance: DistanceMetric) -> Self {
        Self {
            name: name.into(),
            description: COLLECTION_DESCRIPTION.to_string(),
            distance,
        }
    }
}

/// Pagination window for listing documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
        }
    }
}

/// Whether existing ids are rejected or overwritten on add
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddMode {
    #[default]
    Insert,
    Upsert,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_distance_metric_accepts_known_names() {
        assert_eq!(parse_distance_metric("l2").unwrap(), DistanceMetric::L2);
        assert_eq!(
            parse_distance_metric("cosine").unwrap(),
            DistanceMetric::Cosine
        );
        assert_eq!(
            parse_distance_metric("ip").unwrap(),
            DistanceMetric::InnerProduct
        );
    }

    #[test]
    fn test_parse_distance_metric_is_case_sensitive() {
        for input in ["L2", "Cosine", "IP", "euclidean", "", " l2"] {
            let err = parse_distance_metric(input).unwrap_err();
            assert!(
                matches!(err, VectorError::Config(_)),
                "expected config error for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_distance_metric_round_trips_through_server_name() {
        for metric in [
            DistanceMetric::L2,
            DistanceMetric::Cosine,
            DistanceMetric::InnerProduct,
        ] {
            assert_eq!(parse_distance_metric(metric.as_str()).unwrap(), metric);
        }
    }

    #[test]
    fn test_document_metadata_defaults_to_empty() {
        let doc: Document = serde_json::from_str(r#"{"id":"a","text":"hello"}"#).unwrap();
        assert!(doc.metadata.is_empty());
    }

    #[test]
    fn test_collection_spec_carries_description() {
        let spec = CollectionSpec::new(COLLECTION_NAME, DistanceMetric::Cosine);
        assert_eq!(spec.description, COLLECTION_DESCRIPTION);
        assert_eq!(spec.distance, DistanceMetric::Cosine);
    }

    #[test]
    fn test_page_defaults() {
        assert_eq!(Page::default(), Page::new(10, 0));
    }
}
