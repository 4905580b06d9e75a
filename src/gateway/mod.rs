//! Record gateway: collection schemas, seeding, and the per-request store operations.

mod mappers;
pub mod schema;
pub mod seed;
mod service;
pub mod types;

pub use schema::{COLLECTIONS, CollectionSpec, EXAMS, FieldKind, FieldSpec, STUDENTS};
pub use service::{LIST_LIMIT, RecordApi, RecordGateway};
pub use types::{GatewayError, SeedOutcome};
