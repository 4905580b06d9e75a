//! Document store integration: the driver contract plus MongoDB and in-memory backends.

pub mod memory;
pub mod mongo;
pub mod types;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use types::{DocumentStore, StoreError};
