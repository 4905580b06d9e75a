//! HTTP surface for the Record Gateway.
//!
//! This module exposes an Axum router with these endpoints:
//!
//! - `GET /` – Liveness and layout information.
//! - `GET /init` – Replace both collections with synthetic fixtures.
//! - `GET|POST /{collection}` – List up to 50 documents, or create one.
//! - `GET|PUT|DELETE /{collection}/:id` – Fetch, replace, or delete a document by ObjectId.
//! - `GET /metrics` – Write and failure counters since startup.
//! - `GET /api-docs` and `GET /api-docs/openapi.json` – Swagger UI and the OpenAPI document.
//!
//! Collection routes are registered once per entry of [`COLLECTIONS`] and share one generic
//! handler set; the collection descriptor travels in the router state.

use crate::docs::swagger_ui;
use crate::gateway::{COLLECTIONS, CollectionSpec, GatewayError, RecordApi};
use crate::metrics::MetricsSnapshot;
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the HTTP router exposing the record API surface.
pub fn create_router<A>(api: Arc<A>) -> Router
where
    A: RecordApi + 'static,
{
    let service_routes: Router = Router::new()
        .route("/", get(service_info))
        .route("/init", get(seed_collections::<A>))
        .route("/metrics", get(get_metrics::<A>))
        .with_state(api.clone());

    COLLECTIONS
        .iter()
        .fold(service_routes, |router, spec| {
            router.merge(collection_routes(api.clone(), spec))
        })
        .merge(swagger_ui())
        .layer(TraceLayer::new_for_http())
}

/// Router state for the routes of one collection.
struct CollectionState<A> {
    api: Arc<A>,
    spec: &'static CollectionSpec,
}

impl<A> Clone for CollectionState<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            spec: self.spec,
        }
    }
}

fn collection_routes<A>(api: Arc<A>, spec: &'static CollectionSpec) -> Router
where
    A: RecordApi + 'static,
{
    Router::new()
        .route(
            &format!("/{}", spec.name),
            get(list_records::<A>).post(create_record::<A>),
        )
        .route(
            &format!("/{}/:id", spec.name),
            get(get_record::<A>)
                .put(update_record::<A>)
                .delete(delete_record::<A>),
        )
        .with_state(CollectionState { api, spec })
}

/// Operation a request performed, used to pick the status code for a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Seed,
    List,
    Get,
    Create,
    Update,
    Delete,
}

/// Map a gateway failure to the status code clients observe.
///
/// Store failures are reported as 500 on list and 400 on the other record routes. The seed route
/// answers 200 with an `{error}` body, which existing clients of `/init` rely on.
pub(crate) fn status_for(operation: Operation, error: &GatewayError) -> StatusCode {
    match error {
        GatewayError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
        GatewayError::NotFound { .. } => StatusCode::NOT_FOUND,
        GatewayError::InvalidId { .. } | GatewayError::InvalidPayload(_) => {
            StatusCode::BAD_REQUEST
        }
        GatewayError::Store(_) => match operation {
            Operation::Seed => StatusCode::OK,
            Operation::List => StatusCode::INTERNAL_SERVER_ERROR,
            Operation::Get | Operation::Create | Operation::Update | Operation::Delete => {
                StatusCode::BAD_REQUEST
            }
        },
    }
}

struct AppError {
    operation: Operation,
    error: GatewayError,
}

impl AppError {
    fn during(operation: Operation) -> impl FnOnce(GatewayError) -> Self {
        move |error| Self { operation, error }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(self.operation, &self.error);
        tracing::warn!(
            operation = ?self.operation,
            status = status.as_u16(),
            error = %self.error,
            "Request failed"
        );
        (status, Json(json!({ "error": self.error.to_string() }))).into_response()
    }
}

/// Extract the record fields from a request body.
///
/// A request without a JSON content type, or whose JSON is not an object, carries no fields.
/// Bodies declared as JSON that fail to parse are rejected.
fn record_fields(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Map<String, Value>, GatewayError> {
    match payload {
        Ok(Json(Value::Object(fields))) => Ok(fields),
        Ok(Json(_)) | Err(JsonRejection::MissingJsonContentType(_)) => Ok(Map::new()),
        Err(rejection) => Err(GatewayError::InvalidPayload(rejection.body_text())),
    }
}

/// Liveness check describing the service layout.
async fn service_info() -> Json<Value> {
    let collections: Vec<&str> = COLLECTIONS.iter().map(|spec| spec.name).collect();
    Json(json!({
        "status": "ok",
        "swagger_ui": "/api-docs",
        "collections": collections,
        "relation": "1:N (exam -> students)",
    }))
}

/// Clear both collections and insert the synthetic fixtures.
async fn seed_collections<A>(State(api): State<Arc<A>>) -> Result<Json<Value>, AppError>
where
    A: RecordApi,
{
    let outcome = api.seed().await.map_err(AppError::during(Operation::Seed))?;
    Ok(Json(json!({
        "status": "ok",
        "exams": outcome.exams,
        "students": outcome.students,
    })))
}

/// Return a snapshot of the gateway counters.
async fn get_metrics<A>(State(api): State<Arc<A>>) -> Json<MetricsSnapshot>
where
    A: RecordApi,
{
    Json(api.metrics_snapshot())
}

async fn list_records<A>(
    State(state): State<CollectionState<A>>,
) -> Result<Json<Vec<Value>>, AppError>
where
    A: RecordApi,
{
    let documents = state
        .api
        .list(state.spec)
        .await
        .map_err(AppError::during(Operation::List))?;
    Ok(Json(documents))
}

async fn get_record<A>(
    State(state): State<CollectionState<A>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError>
where
    A: RecordApi,
{
    let document = state
        .api
        .get(state.spec, &id)
        .await
        .map_err(AppError::during(Operation::Get))?;
    Ok(Json(document))
}

async fn create_record<A>(
    State(state): State<CollectionState<A>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Map<String, Value>>), AppError>
where
    A: RecordApi,
{
    let fields = record_fields(payload).map_err(AppError::during(Operation::Create))?;
    let created = state
        .api
        .create(state.spec, fields)
        .await
        .map_err(AppError::during(Operation::Create))?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_record<A>(
    State(state): State<CollectionState<A>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError>
where
    A: RecordApi,
{
    let fields = record_fields(payload).map_err(AppError::during(Operation::Update))?;
    state
        .api
        .update(state.spec, &id, fields)
        .await
        .map_err(AppError::during(Operation::Update))?;
    Ok(Json(json!({ "status": "updated" })))
}

async fn delete_record<A>(
    State(state): State<CollectionState<A>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError>
where
    A: RecordApi,
{
    state
        .api
        .delete(state.spec, &id)
        .await
        .map_err(AppError::during(Operation::Delete))?;
    Ok(Json(json!({ "status": "deleted" })))
}
