//! Error types for the store layer.

use crate::DocKey;

/// Errors a [`DocumentStore`](crate::DocumentStore) can report.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No document exists under the key.
    #[error("document {0} not found")]
    NotFound(DocKey),

    /// `create` found a document already stored under the key.
    #[error("document {0} already exists")]
    AlreadyExists(DocKey),

    /// A list operation targeted a field that holds something other than
    /// a list.
    #[error("field {field:?} of {key} is not an array")]
    NotAnArray { key: DocKey, field: String },

    /// A document could not be converted to or from its record shape.
    #[error("invalid document: {0}")]
    InvalidDocument(#[source] serde_json::Error),

    /// The backend could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
