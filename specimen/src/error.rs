// Crate Errors
// Top-level error type for loading and parsing spec files

use crate::document::DocumentError;
use crate::spec::SchemaError;

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the library entry points
#[derive(Debug, Error)]
pub enum SpecimenError {
    #[error("Failed to read spec file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Document {
        path: String,
        #[source]
        source: DocumentError,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Result type for library operations
pub type SpecimenResult<T> = Result<T, SpecimenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_the_path() {
        let err = SpecimenError::Io {
            path: PathBuf::from("/missing/zoo.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let text = err.to_string();
        assert!(text.contains("/missing/zoo.yaml"));
        assert!(text.contains("no such file"));
    }

    #[test]
    fn test_document_error_keeps_source() {
        let err = SpecimenError::Document {
            path: "zoo.yaml".to_string(),
            source: DocumentError::new("did not find expected key", 3, 7),
        };
        assert!(err.to_string().starts_with("Invalid YAML in zoo.yaml"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
