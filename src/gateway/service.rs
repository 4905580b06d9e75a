//! Gateway service translating record operations into single document store calls.

use crate::{
    gateway::{
        mappers::{document_to_json, fields_to_document},
        schema::{CollectionSpec, EXAMS, STUDENTS},
        seed::{synthetic_exams, synthetic_students},
        types::{GatewayError, SeedOutcome},
    },
    metrics::{GatewayMetrics, MetricsSnapshot},
    store::{DocumentStore, StoreError},
};
use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId};
use serde_json::{Map, Value};
use std::sync::{Arc, OnceLock};

/// Maximum number of documents returned by a list call.
pub const LIST_LIMIT: i64 = 50;

/// Owns the document store handle and performs one store round-trip per operation.
///
/// The store is installed exactly once. Until then every operation fails with
/// [`GatewayError::NotReady`], which lets the HTTP listener come up before the database
/// connection is established.
pub struct RecordGateway {
    store: OnceLock<Arc<dyn DocumentStore>>,
    metrics: GatewayMetrics,
}

/// Abstraction over record operations used by the HTTP surface.
#[async_trait]
pub trait RecordApi: Send + Sync {
    /// Replace both collections with synthetic fixtures.
    async fn seed(&self) -> Result<SeedOutcome, GatewayError>;

    /// Return up to [`LIST_LIMIT`] documents of a collection.
    async fn list(&self, spec: &'static CollectionSpec) -> Result<Vec<Value>, GatewayError>;

    /// Fetch one document by identifier.
    async fn get(&self, spec: &'static CollectionSpec, id: &str) -> Result<Value, GatewayError>;

    /// Insert the declared fields of `body`; returns `{id, ...submitted fields}`.
    async fn create(
        &self,
        spec: &'static CollectionSpec,
        body: Map<String, Value>,
    ) -> Result<Map<String, Value>, GatewayError>;

    /// Replace the declared fields of the identified document.
    async fn update(
        &self,
        spec: &'static CollectionSpec,
        id: &str,
        body: Map<String, Value>,
    ) -> Result<(), GatewayError>;

    /// Remove the identified document.
    async fn delete(&self, spec: &'static CollectionSpec, id: &str) -> Result<(), GatewayError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl RecordGateway {
    /// Build a gateway whose store will be installed later.
    pub fn new() -> Self {
        Self {
            store: OnceLock::new(),
            metrics: GatewayMetrics::new(),
        }
    }

    /// Build a gateway that is ready immediately.
    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        let gateway = Self::new();
        gateway.install_store(store);
        gateway
    }

    /// Install the store handle. Returns `false` when one was already installed.
    pub fn install_store(&self, store: Arc<dyn DocumentStore>) -> bool {
        let installed = self.store.set(store).is_ok();
        if installed {
            tracing::info!("Document store ready");
        } else {
            tracing::warn!("Document store already installed; ignoring replacement");
        }
        installed
    }

    /// Whether a store handle has been installed.
    pub fn is_ready(&self) -> bool {
        self.store.get().is_some()
    }

    fn store(&self) -> Result<&dyn DocumentStore, GatewayError> {
        self.store
            .get()
            .map(|store| &**store)
            .ok_or(GatewayError::NotReady)
    }

    fn tracked<T>(&self, result: Result<T, StoreError>) -> Result<T, GatewayError> {
        result.map_err(|err| {
            self.metrics.record_store_failure();
            tracing::error!(error = %err, "Document store call failed");
            GatewayError::Store(err)
        })
    }
}

impl Default for RecordGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_id(id: &str) -> Result<ObjectId, GatewayError> {
    ObjectId::parse_str(id).map_err(|err| GatewayError::InvalidId {
        id: id.to_string(),
        reason: err.to_string(),
    })
}

#[async_trait]
impl RecordApi for RecordGateway {
    async fn seed(&self) -> Result<SeedOutcome, GatewayError> {
        let store = self.store()?;
        self.tracked(store.delete_many(EXAMS.name, doc! {}).await)?;
        self.tracked(store.delete_many(STUDENTS.name, doc! {}).await)?;

        let exam_ids = self.tracked(store.insert_many(EXAMS.name, synthetic_exams()).await)?;
        let student_ids = self.tracked(
            store
                .insert_many(STUDENTS.name, synthetic_students(&exam_ids))
                .await,
        )?;

        self.metrics.record_seed();
        let outcome = SeedOutcome {
            exams: exam_ids.len(),
            students: student_ids.len(),
        };
        tracing::info!(
            exams = outcome.exams,
            students = outcome.students,
            "Collections seeded"
        );
        Ok(outcome)
    }

    async fn list(&self, spec: &'static CollectionSpec) -> Result<Vec<Value>, GatewayError> {
        let store = self.store()?;
        let documents = self.tracked(store.find(spec.name, doc! {}, LIST_LIMIT).await)?;
        Ok(documents.into_iter().map(document_to_json).collect())
    }

    async fn get(&self, spec: &'static CollectionSpec, id: &str) -> Result<Value, GatewayError> {
        let store = self.store()?;
        let object_id = parse_id(id)?;
        self.tracked(store.find_one(spec.name, object_id).await)?
            .map(document_to_json)
            .ok_or(GatewayError::NotFound { kind: spec.kind })
    }

    async fn create(
        &self,
        spec: &'static CollectionSpec,
        body: Map<String, Value>,
    ) -> Result<Map<String, Value>, GatewayError> {
        let store = self.store()?;
        let fields = spec.project(&body);
        let document = fields_to_document(&fields)?;
        let id = self.tracked(store.insert_one(spec.name, document).await)?;

        self.metrics.record_created();
        tracing::debug!(collection = spec.name, id = %id, "Record created");

        // Omitted fields are stored as null but not echoed.
        let mut created = Map::with_capacity(fields.len() + 1);
        created.insert("id".into(), Value::String(id.to_hex()));
        created.extend(fields.into_iter().filter(|(key, _)| body.contains_key(key)));
        Ok(created)
    }

    async fn update(
        &self,
        spec: &'static CollectionSpec,
        id: &str,
        body: Map<String, Value>,
    ) -> Result<(), GatewayError> {
        let store = self.store()?;
        let object_id = parse_id(id)?;
        let fields = fields_to_document(&spec.project(&body))?;
        if !self.tracked(store.update_one(spec.name, object_id, fields).await)? {
            return Err(GatewayError::NotFound { kind: spec.kind });
        }

        self.metrics.record_updated();
        tracing::debug!(collection = spec.name, id, "Record updated");
        Ok(())
    }

    async fn delete(&self, spec: &'static CollectionSpec, id: &str) -> Result<(), GatewayError> {
        let store = self.store()?;
        let object_id = parse_id(id)?;
        if !self.tracked(store.delete_one(spec.name, object_id).await)? {
            return Err(GatewayError::NotFound { kind: spec.kind });
        }

        self.metrics.record_deleted();
        tracing::debug!(collection = spec.name, id, "Record deleted");
        Ok(())
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn ready_gateway() -> (RecordGateway, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (RecordGateway::with_store(store.clone()), store)
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[tokio::test]
    async fn operations_fail_until_store_is_installed() {
        let gateway = RecordGateway::new();
        assert!(!gateway.is_ready());
        assert!(matches!(
            gateway.list(&EXAMS).await,
            Err(GatewayError::NotReady)
        ));
        assert!(matches!(gateway.seed().await, Err(GatewayError::NotReady)));

        assert!(gateway.install_store(Arc::new(MemoryStore::new())));
        assert!(!gateway.install_store(Arc::new(MemoryStore::new())));
        assert!(gateway.is_ready());
        assert!(gateway.list(&EXAMS).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn seeding_twice_leaves_exactly_fifty_of_each() {
        let (gateway, store) = ready_gateway();
        let first = gateway.seed().await.expect("seed");
        let second = gateway.seed().await.expect("seed");

        assert_eq!(first, SeedOutcome { exams: 50, students: 50 });
        assert_eq!(second, first);
        assert_eq!(store.count("exams").await, 50);
        assert_eq!(store.count("students").await, 50);
        assert_eq!(gateway.metrics_snapshot().seeds_completed, 2);
    }

    #[tokio::test]
    async fn seeded_students_reference_seeded_exams() {
        let (gateway, _) = ready_gateway();
        gateway.seed().await.expect("seed");

        let students = gateway.list(&STUDENTS).await.expect("list");
        let first_exam_id = students[0]["exam_id"].as_str().expect("hex id").to_string();
        let exam = gateway.get(&EXAMS, &first_exam_id).await.expect("exam");
        assert_eq!(exam["type"], "exam1");
    }

    #[tokio::test]
    async fn create_then_get_returns_submitted_fields() {
        let (gateway, _) = ready_gateway();
        let created = gateway
            .create(
                &EXAMS,
                object(json!({ "type": "A", "specialty": "B", "date": "2025-01-01", "x": 1 })),
            )
            .await
            .expect("create");

        let id = created["id"].as_str().expect("id").to_string();
        assert!(!created.contains_key("x"));

        let fetched = gateway.get(&EXAMS, &id).await.expect("get");
        assert_eq!(fetched["_id"], json!(id));
        assert_eq!(fetched["type"], "A");
        assert_eq!(fetched["specialty"], "B");
        assert_eq!(fetched["date"], "2025-01-01");
        assert!(fetched.get("x").is_none());
    }

    #[tokio::test]
    async fn missing_fields_are_stored_as_null() {
        let (gateway, _) = ready_gateway();
        let created = gateway
            .create(&STUDENTS, object(json!({ "name": "Ana" })))
            .await
            .expect("create");
        assert_eq!(created["name"], "Ana");
        assert!(!created.contains_key("age"));
        assert!(!created.contains_key("exam_id"));

        let id = created["id"].as_str().expect("id").to_string();
        let fetched = gateway.get(&STUDENTS, &id).await.expect("get");
        assert_eq!(fetched["age"], Value::Null);
        assert_eq!(fetched["exam_id"], Value::Null);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let (gateway, _) = ready_gateway();
        let unknown = ObjectId::new().to_hex();

        assert!(matches!(
            gateway.get(&EXAMS, &unknown).await,
            Err(GatewayError::NotFound { kind: "Exam" })
        ));
        assert!(matches!(
            gateway.update(&STUDENTS, &unknown, Map::new()).await,
            Err(GatewayError::NotFound { kind: "Student" })
        ));
        assert!(matches!(
            gateway.delete(&EXAMS, &unknown).await,
            Err(GatewayError::NotFound { kind: "Exam" })
        ));
    }

    #[tokio::test]
    async fn malformed_ids_are_rejected_before_the_store() {
        let (gateway, _) = ready_gateway();
        for id in ["", "abc", "zzzzzzzzzzzzzzzzzzzzzzzz", "652f1c2e9b1e8a3d4c5b6a7"] {
            assert!(matches!(
                gateway.get(&EXAMS, id).await,
                Err(GatewayError::InvalidId { .. })
            ));
            assert!(matches!(
                gateway.update(&EXAMS, id, Map::new()).await,
                Err(GatewayError::InvalidId { .. })
            ));
            assert!(matches!(
                gateway.delete(&EXAMS, id).await,
                Err(GatewayError::InvalidId { .. })
            ));
        }
        assert_eq!(gateway.metrics_snapshot().store_failures, 0);
    }

    #[tokio::test]
    async fn update_replaces_fields_without_integrity_checks() {
        let (gateway, _) = ready_gateway();
        let created = gateway
            .create(
                &STUDENTS,
                object(json!({ "name": "Ana", "age": 20, "exam_id": "x" })),
            )
            .await
            .expect("create");
        let id = created["id"].as_str().expect("id").to_string();

        gateway
            .update(
                &STUDENTS,
                &id,
                object(json!({ "name": "X", "age": 30, "exam_id": "nowhere" })),
            )
            .await
            .expect("update");

        let fetched = gateway.get(&STUDENTS, &id).await.expect("get");
        assert_eq!(fetched["name"], "X");
        assert_eq!(fetched["age"], 30);
        assert_eq!(fetched["exam_id"], "nowhere");
    }

    #[tokio::test]
    async fn delete_removes_document() {
        let (gateway, store) = ready_gateway();
        let created = gateway
            .create(&EXAMS, object(json!({ "type": "A" })))
            .await
            .expect("create");
        let id = created["id"].as_str().expect("id").to_string();

        gateway.delete(&EXAMS, &id).await.expect("delete");
        assert_eq!(store.count("exams").await, 0);
        assert!(matches!(
            gateway.delete(&EXAMS, &id).await,
            Err(GatewayError::NotFound { .. })
        ));

        let snapshot = gateway.metrics_snapshot();
        assert_eq!(snapshot.records_created, 1);
        assert_eq!(snapshot.records_deleted, 1);
    }
}
