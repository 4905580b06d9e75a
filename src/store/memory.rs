//! Process-local document store used for local runs and tests.

use crate::store::types::{DocumentStore, StoreError};
use async_trait::async_trait;
use mongodb::bson::{Bson, Document, oid::ObjectId};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory document store keyed by collection name.
///
/// Documents keep insertion order. Filters support top-level equality only, which covers the
/// empty filter the gateway issues.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the documents currently held in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

fn matches_filter(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| document.get(key) == Some(expected))
}

fn has_id(document: &Document, id: &ObjectId) -> bool {
    matches!(document.get("_id"), Some(Bson::ObjectId(existing)) if existing == id)
}

/// Assign a fresh `_id` as the first key, mirroring how MongoDB lays out inserted documents.
fn with_new_id(document: Document) -> (ObjectId, Document) {
    let id = ObjectId::new();
    let mut stored = Document::new();
    stored.insert("_id", id);
    for (key, value) in document {
        if key != "_id" {
            stored.insert(key, value);
        }
    }
    (id, stored)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        limit: i64,
    ) -> Result<Vec<Document>, StoreError> {
        let guard = self.collections.read().await;
        let Some(documents) = guard.get(collection) else {
            return Ok(Vec::new());
        };
        let cap = usize::try_from(limit).ok().filter(|cap| *cap > 0);
        let matching = documents.iter().filter(|doc| matches_filter(doc, &filter)).cloned();
        Ok(match cap {
            Some(cap) => matching.take(cap).collect(),
            None => matching.collect(),
        })
    }

    async fn find_one(
        &self,
        collection: &str,
        id: ObjectId,
    ) -> Result<Option<Document>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .and_then(|documents| documents.iter().find(|doc| has_id(doc, &id)))
            .cloned())
    }

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<ObjectId, StoreError> {
        let (id, stored) = with_new_id(document);
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(stored);
        Ok(id)
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<ObjectId>, StoreError> {
        let mut guard = self.collections.write().await;
        let target = guard.entry(collection.to_string()).or_default();
        let mut ids = Vec::with_capacity(documents.len());
        for document in documents {
            let (id, stored) = with_new_id(document);
            target.push(stored);
            ids.push(id);
        }
        Ok(ids)
    }

    async fn update_one(
        &self,
        collection: &str,
        id: ObjectId,
        fields: Document,
    ) -> Result<bool, StoreError> {
        let mut guard = self.collections.write().await;
        let Some(document) = guard
            .get_mut(collection)
            .and_then(|documents| documents.iter_mut().find(|doc| has_id(doc, &id)))
        else {
            return Ok(false);
        };
        for (key, value) in fields {
            if key != "_id" {
                document.insert(key, value);
            }
        }
        Ok(true)
    }

    async fn delete_one(&self, collection: &str, id: ObjectId) -> Result<bool, StoreError> {
        let mut guard = self.collections.write().await;
        let Some(documents) = guard.get_mut(collection) else {
            return Ok(false);
        };
        match documents.iter().position(|doc| has_id(doc, &id)) {
            Some(index) => {
                documents.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> Result<u64, StoreError> {
        let mut guard = self.collections.write().await;
        let Some(documents) = guard.get_mut(collection) else {
            return Ok(0);
        };
        let before = documents.len();
        documents.retain(|doc| !matches_filter(doc, &filter));
        Ok((before - documents.len()) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
