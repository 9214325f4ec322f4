use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("{operation} failed: {message}")]
    Remote { operation: String, message: String },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Operation cancelled")]
    Cancelled,
}

pub type VectorResult<T> = Result<T, VectorError>;

impl VectorError {
    pub fn config(message: impl Into<String>) -> Self {
        VectorError::Config(message.into())
    }

    pub fn remote(operation: impl Into<String>, message: impl Into<String>) -> Self {
        VectorError::Remote {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Stable, lowercase name of the error kind (used as a structured log field)
    pub fn kind(&self) -> &'static str {
        match self {
            VectorError::Config(_) => "config",
            VectorError::Io { .. } => "io",
            VectorError::Parse { .. } => "parse",
            VectorError::Connection(_) => "connection",
            VectorError::Remote { .. } => "remote",
            VectorError::Embedding(_) => "embedding",
            VectorError::Cancelled => "cancelled",
        }
    }
}

impl From<reqwest::Error> for VectorError {
    fn from(err: reqwest::Error) -> Self {
        VectorError::Embedding(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_names_operation() {
        let err = VectorError::remote("add documents", "duplicate id: a");
        assert_eq!(err.to_string(), "add documents failed: duplicate id: a");
        assert_eq!(err.kind(), "remote");
    }

    #[test]
    fn test_io_error_mentions_path() {
        let err = VectorError::Io {
            path: PathBuf::from("docs.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("docs.yaml"));
        assert_eq!(err.kind(), "io");
    }
}
