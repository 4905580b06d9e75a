//! Error and result types for gateway operations.

use crate::store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Errors emitted by gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A request arrived before the document store connection was installed.
    #[error("Document store is not connected yet")]
    NotReady,
    /// The path identifier is not a valid ObjectId.
    #[error("Invalid identifier '{id}': {reason}")]
    InvalidId {
        /// Identifier as supplied by the client.
        id: String,
        /// Parser diagnostic.
        reason: String,
    },
    /// No document carries the requested identifier.
    #[error("{kind} not found")]
    NotFound {
        /// Singular label of the collection (`Exam`, `Student`).
        kind: &'static str,
    },
    /// A submitted value could not be encoded for storage.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    /// The document store rejected or failed the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Counts reported after a successful seed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedOutcome {
    /// Exams inserted.
    pub exams: usize,
    /// Students inserted.
    pub students: usize,
}
