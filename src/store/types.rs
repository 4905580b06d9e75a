//! Shared types used by the document store backends.

use async_trait::async_trait;
use mongodb::bson::{Document, oid::ObjectId};
use thiserror::Error;

/// Errors returned while interacting with the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The MongoDB driver reported a failure (connectivity, server error, write error).
    #[error("MongoDB request failed: {0}")]
    Driver(#[from] mongodb::error::Error),
    /// An insert acknowledged a document without returning its ObjectId.
    #[error("Store returned no ObjectId for inserted document at position {0}")]
    MissingId(usize),
}

/// Minimal driver surface the gateway needs from a document database.
///
/// Every method maps to exactly one round-trip. Collections are addressed by name so a single
/// store instance serves both `exams` and `students`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Return up to `limit` documents matching `filter`, in store order.
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        limit: i64,
    ) -> Result<Vec<Document>, StoreError>;

    /// Fetch the document whose `_id` equals `id`.
    async fn find_one(&self, collection: &str, id: ObjectId)
    -> Result<Option<Document>, StoreError>;

    /// Insert one document and return the identifier assigned to it.
    async fn insert_one(&self, collection: &str, document: Document)
    -> Result<ObjectId, StoreError>;

    /// Insert documents and return their identifiers in insertion order.
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<ObjectId>, StoreError>;

    /// Set `fields` on the document whose `_id` equals `id`. Returns whether a document matched.
    async fn update_one(
        &self,
        collection: &str,
        id: ObjectId,
        fields: Document,
    ) -> Result<bool, StoreError>;

    /// Remove the document whose `_id` equals `id`. Returns whether a document was removed.
    async fn delete_one(&self, collection: &str, id: ObjectId) -> Result<bool, StoreError>;

    /// Remove every document matching `filter` and return how many were removed.
    async fn delete_many(&self, collection: &str, filter: Document) -> Result<u64, StoreError>;

    /// Round-trip to the backend to confirm it is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
