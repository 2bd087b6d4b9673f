//! In-process [`DocumentStore`] backed by a lock-guarded map.

use std::collections::HashMap;

use rand::distr::{Alphanumeric, SampleString};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{DocKey, Document, DocumentStore, StoreError};

/// Length of ids generated by [`DocumentStore::add`].
const GENERATED_ID_LEN: usize = 20;

/// An in-memory document store.
///
/// Every operation runs under one write lock, so the list operations are
/// trivially atomic with respect to each other.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<DocKey, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        self.docs
            .read()
            .await
            .keys()
            .filter(|key| key.collection == collection)
            .count()
    }

    /// Returns `true` if a document exists under `key`.
    pub async fn contains(&self, key: &DocKey) -> bool {
        self.docs.read().await.contains_key(key)
    }
}

/// Looks up the list stored in `field`, creating an empty one if the field
/// is missing.
fn array_field<'a>(
    doc: &'a mut Document,
    key: &DocKey,
    field: &str,
) -> Result<&'a mut Vec<Value>, StoreError> {
    match doc
        .entry(field.to_owned())
        .or_insert_with(|| Value::Array(Vec::new()))
    {
        Value::Array(items) => Ok(items),
        _ => Err(StoreError::NotAnArray {
            key: key.clone(),
            field: field.to_owned(),
        }),
    }
}

impl DocumentStore for MemoryStore {
    async fn get(&self, key: &DocKey) -> Result<Document, StoreError> {
        self.docs
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.clone()))
    }

    async fn create(&self, key: &DocKey, doc: Document) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        if docs.contains_key(key) {
            return Err(StoreError::AlreadyExists(key.clone()));
        }
        docs.insert(key.clone(), doc);
        Ok(())
    }

    async fn add(&self, collection: &'static str, doc: Document) -> Result<String, StoreError> {
        let mut docs = self.docs.write().await;
        let key = loop {
            let id = Alphanumeric.sample_string(&mut rand::rng(), GENERATED_ID_LEN);
            let key = DocKey::new(collection, id);
            if !docs.contains_key(&key) {
                break key;
            }
        };
        let id = key.id.clone();
        tracing::trace!(%key, "document added");
        docs.insert(key, doc);
        Ok(id)
    }

    async fn update(&self, key: &DocKey, field: &str, value: Value) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        let doc = docs
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        doc.insert(field.to_owned(), value);
        Ok(())
    }

    async fn array_union(&self, key: &DocKey, field: &str, value: Value) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        let doc = docs
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        let items = array_field(doc, key, field)?;
        if !items.contains(&value) {
            items.push(value);
        }
        Ok(())
    }

    async fn array_append(&self, key: &DocKey, field: &str, value: Value) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        let doc = docs
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        array_field(doc, key, field)?.push(value);
        Ok(())
    }

    async fn array_remove(&self, key: &DocKey, field: &str, value: Value) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        let doc = docs
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        array_field(doc, key, field)?.retain(|item| *item != value);
        Ok(())
    }

    async fn delete(&self, key: &DocKey) -> Result<(), StoreError> {
        if self.docs.write().await.remove(key).is_some() {
            tracing::trace!(%key, "document deleted");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn key(id: &str) -> DocKey {
        DocKey::new("things", id)
    }

    #[tokio::test]
    async fn test_create_then_get_returns_document() {
        let store = MemoryStore::new();
        store.create(&key("a"), doc(json!({"x": 1}))).await.unwrap();

        let got = store.get(&key("a")).await.unwrap();
        assert_eq!(got["x"], 1);
    }

    #[tokio::test]
    async fn test_create_existing_returns_already_exists() {
        let store = MemoryStore::new();
        store.create(&key("a"), Document::new()).await.unwrap();

        let result = store.create(&key("a"), Document::new()).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists(k)) if k == key("a")));
    }

    #[tokio::test]
    async fn test_get_missing_returns_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(store.get(&key("nope")).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_generates_distinct_alphanumeric_ids() {
        let store = MemoryStore::new();
        let a = store.add("rooms", Document::new()).await.unwrap();
        let b = store.add("rooms", Document::new()).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(a.len(), GENERATED_ID_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(store.count("rooms").await, 2);
    }

    #[tokio::test]
    async fn test_update_missing_document_returns_not_found() {
        let store = MemoryStore::new();
        let result = store.update(&key("a"), "x", json!(1)).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_array_union_skips_duplicates() {
        let store = MemoryStore::new();
        store.create(&key("a"), doc(json!({"items": []}))).await.unwrap();

        store.array_union(&key("a"), "items", json!("bob")).await.unwrap();
        store.array_union(&key("a"), "items", json!("bob")).await.unwrap();
        store.array_union(&key("a"), "items", json!("eve")).await.unwrap();

        let got = store.get(&key("a")).await.unwrap();
        assert_eq!(got["items"], json!(["bob", "eve"]));
    }

    #[tokio::test]
    async fn test_array_union_creates_missing_field() {
        let store = MemoryStore::new();
        store.create(&key("a"), Document::new()).await.unwrap();

        store.array_union(&key("a"), "items", json!(1)).await.unwrap();

        assert_eq!(store.get(&key("a")).await.unwrap()["items"], json!([1]));
    }

    #[tokio::test]
    async fn test_array_append_keeps_duplicates() {
        let store = MemoryStore::new();
        store.create(&key("a"), Document::new()).await.unwrap();

        store.array_append(&key("a"), "items", json!("gg")).await.unwrap();
        store.array_append(&key("a"), "items", json!("gg")).await.unwrap();

        assert_eq!(store.get(&key("a")).await.unwrap()["items"], json!(["gg", "gg"]));
    }

    #[tokio::test]
    async fn test_array_append_missing_document_returns_not_found() {
        let store = MemoryStore::new();
        let result = store.array_append(&key("a"), "items", json!(1)).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_array_remove_drops_matching_elements() {
        let store = MemoryStore::new();
        store
            .create(&key("a"), doc(json!({"items": ["bob", "eve"]})))
            .await
            .unwrap();

        store.array_remove(&key("a"), "items", json!("bob")).await.unwrap();
        store.array_remove(&key("a"), "items", json!("nobody")).await.unwrap();

        assert_eq!(store.get(&key("a")).await.unwrap()["items"], json!(["eve"]));
    }

    #[tokio::test]
    async fn test_array_ops_on_scalar_field_fail() {
        let store = MemoryStore::new();
        store.create(&key("a"), doc(json!({"items": 3}))).await.unwrap();

        let result = store.array_union(&key("a"), "items", json!(1)).await;
        assert!(matches!(result, Err(StoreError::NotAnArray { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_array_union_keeps_every_element() {
        let store = std::sync::Arc::new(MemoryStore::new());
        store.create(&key("a"), Document::new()).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = std::sync::Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.array_union(&key("a"), "items", json!(i)).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let got = store.get(&key("a")).await.unwrap();
        assert_eq!(got["items"].as_array().unwrap().len(), 32);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        store.create(&key("a"), Document::new()).await.unwrap();

        store.delete(&key("a")).await.unwrap();
        store.delete(&key("a")).await.unwrap();

        assert!(!store.contains(&key("a")).await);
    }
}
