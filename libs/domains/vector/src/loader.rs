//! YAML document loader
//!
//! Input files are a stream of `---`-separated mappings:
//!
//! ```yaml
//! id: doc1
//! text: Neural networks learn representations.
//! metadata:
//!   topic: ai
//! ---
//! id: doc2
//! text: Rust has no garbage collector.
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{VectorError, VectorResult};
use crate::models::Document;

/// Load every document in `path`, in file order.
///
/// Empty YAML documents are skipped, so an empty file yields an empty vector.
/// A single malformed record fails the whole load.
pub fn load_documents(path: impl AsRef<Path>) -> VectorResult<Vec<Document>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| VectorError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let records = serde_yaml_ng::Deserializer::from_reader(BufReader::new(file));
    let mut documents = Vec::new();
    for (index, record) in records.enumerate() {
        let document = Option::<Document>::deserialize(record).map_err(|e| VectorError::Parse {
            path: path.to_path_buf(),
            message: format!("record {}: {}", index + 1, e),
        })?;

        if let Some(document) = document {
            documents.push(document);
        }
    }

    debug!(count = documents.len(), path = %path.display(), "loaded documents");
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_fixture(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_loads_documents_in_file_order() {
        let file = write_fixture(
            "id: a\ntext: hello\nmetadata:\n  k: v\n---\nid: b\ntext: world\n---\nid: c\ntext: again\nmetadata:\n  lang: en\n  topic: greeting\n",
        );

        let docs = load_documents(file.path()).unwrap();

        assert_eq!(docs.len(), 3);
        assert_eq!(
            docs.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        assert_eq!(docs[0], Document::new("a", "hello").with_metadata("k", "v"));
        assert!(docs[1].metadata.is_empty());
        assert_eq!(docs[2].metadata.len(), 2);
    }

    #[test]
    fn test_leading_separator_and_trailing_empty_document() {
        let file = write_fixture("---\nid: a\ntext: hello\n---\n");
        let docs = load_documents(file.path()).unwrap();
        assert_eq!(docs, vec![Document::new("a", "hello")]);
    }

    #[test]
    fn test_empty_file_yields_no_documents() {
        let file = write_fixture("");
        assert!(load_documents(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_comment_only_file_yields_no_documents() {
        let file = write_fixture("# nothing here yet\n");
        assert!(load_documents(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_documents(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, VectorError::Io { .. }));
    }

    #[test]
    fn test_malformed_record_fails_whole_load() {
        let file = write_fixture("id: a\ntext: hello\n---\nid: b\n---\nid: c\ntext: fine\n");
        let err = load_documents(file.path()).unwrap_err();
        match err {
            VectorError::Parse { message, .. } => assert!(message.contains("record 2")),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_metadata_is_parse_error() {
        let file = write_fixture("id: a\ntext: hello\nmetadata:\n  tags:\n    - x\n");
        assert!(matches!(
            load_documents(file.path()),
            Err(VectorError::Parse { .. })
        ));
    }

    #[test]
    fn test_non_mapping_record_is_parse_error() {
        let file = write_fixture("- just\n- a list\n");
        assert!(matches!(
            load_documents(file.path()),
            Err(VectorError::Parse { .. })
        ));
    }
}
