//! The [`DocumentStore`] trait and document addressing.

use std::fmt;
use std::future::Future;

use crate::StoreError;

/// A stored document: a JSON object keyed by field name.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Address of one document: its collection and its id within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocKey {
    pub collection: &'static str,
    pub id: String,
}

impl DocKey {
    pub fn new(collection: &'static str, id: impl Into<String>) -> Self {
        Self {
            collection,
            id: id.into(),
        }
    }
}

impl fmt::Display for DocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// An external key/document service.
///
/// One handle is created at startup, shared through an `Arc`, and passed
/// explicitly to every component that persists something.
///
/// # Atomicity
///
/// Each method is atomic on its own. [`array_union`](Self::array_union),
/// [`array_append`](Self::array_append) and
/// [`array_remove`](Self::array_remove) in particular must not lose
/// concurrent updates to the same field. Nothing is atomic *across* calls.
pub trait DocumentStore: Send + Sync + 'static {
    /// Reads a document.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if nothing is stored under `key`.
    fn get(
        &self,
        key: &DocKey,
    ) -> impl Future<Output = Result<Document, StoreError>> + Send;

    /// Stores a document under a caller-chosen id, only if none exists.
    ///
    /// # Errors
    /// [`StoreError::AlreadyExists`] if `key` is taken.
    fn create(
        &self,
        key: &DocKey,
        doc: Document,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Stores a document under a freshly generated id and returns the id.
    fn add(
        &self,
        collection: &'static str,
        doc: Document,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Overwrites one field of an existing document.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the document does not exist.
    fn update(
        &self,
        key: &DocKey,
        field: &str,
        value: serde_json::Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Appends `value` to the list in `field` unless an equal element is
    /// already present. A missing field is treated as an empty list.
    fn array_union(
        &self,
        key: &DocKey,
        field: &str,
        value: serde_json::Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Appends `value` to the list in `field`, even if an equal element is
    /// already present. A missing field is treated as an empty list.
    fn array_append(
        &self,
        key: &DocKey,
        field: &str,
        value: serde_json::Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removes every element equal to `value` from the list in `field`.
    fn array_remove(
        &self,
        key: &DocKey,
        field: &str,
        value: serde_json::Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Deletes a document. Deleting a missing document succeeds.
    fn delete(
        &self,
        key: &DocKey,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
