//! Generated API reference.
//!
//! The route catalog is derived from [`COLLECTIONS`], so adding a collection schema documents its
//! routes without further edits. The catalog is turned into an OpenAPI 3 document with `utoipa`
//! and served through Swagger UI (`GET /api-docs`, document at `GET /api-docs/openapi.json`).

use crate::gateway::{COLLECTIONS, CollectionSpec, FieldKind};
use serde_json::json;
use std::collections::BTreeMap;
use utoipa::openapi::{
    InfoBuilder, OpenApi, OpenApiBuilder, RefOr, Required, Schema,
    content::ContentBuilder,
    path::{OperationBuilder, ParameterBuilder, ParameterIn, PathItemBuilder, PathItemType},
    request_body::RequestBodyBuilder,
    response::ResponseBuilder,
    schema::{ArrayBuilder, ObjectBuilder, SchemaType},
};
use utoipa_swagger_ui::SwaggerUi;

/// Path serving the interactive Swagger UI.
pub const SWAGGER_UI_PATH: &str = "/api-docs";
/// Path serving the OpenAPI document the UI renders.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// HTTP verbs used by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    fn path_item_type(self) -> PathItemType {
        match self {
            Self::Get => PathItemType::Get,
            Self::Post => PathItemType::Post,
            Self::Put => PathItemType::Put,
            Self::Delete => PathItemType::Delete,
        }
    }
}

/// Descriptor for a single route in the reference.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Route template in OpenAPI form (`/exams/{id}`).
    pub path: String,
    /// Grouping tag.
    pub tag: &'static str,
    /// Stable operation identifier.
    pub operation_id: String,
    /// One-line description.
    pub summary: String,
    /// Whether the route takes an `{id}` path parameter.
    pub takes_id: bool,
    /// Collection whose fields form the JSON request body.
    pub body: Option<&'static CollectionSpec>,
    /// Documented status codes with descriptions.
    pub responses: Vec<(u16, String)>,
}

/// Enumerate every route served by the gateway.
pub fn endpoints() -> Vec<Endpoint> {
    let mut endpoints = vec![
        Endpoint {
            method: HttpMethod::Get,
            path: "/".into(),
            tag: "service",
            operation_id: "service_info".into(),
            summary: "Service status, documentation location, and collection layout".into(),
            takes_id: false,
            body: None,
            responses: vec![(200, "Service information".into())],
        },
        Endpoint {
            method: HttpMethod::Get,
            path: "/init".into(),
            tag: "service",
            operation_id: "seed_collections".into(),
            summary: "Replace both collections with 50 synthetic exams and 50 students".into(),
            takes_id: false,
            body: None,
            responses: vec![
                (200, "Data inserted, or `{error}` when the store fails".into()),
                (503, "Document store not connected yet".into()),
            ],
        },
        Endpoint {
            method: HttpMethod::Get,
            path: "/metrics".into(),
            tag: "service",
            operation_id: "metrics".into(),
            summary: "Write and failure counters since startup".into(),
            takes_id: false,
            body: None,
            responses: vec![(200, "Counter snapshot".into())],
        },
    ];

    for spec in COLLECTIONS {
        endpoints.extend(collection_endpoints(spec));
    }
    endpoints
}

fn collection_endpoints(spec: &'static CollectionSpec) -> Vec<Endpoint> {
    let name = spec.name;
    let kind = spec.kind;
    let lower = kind.to_lowercase();
    let collection_path = format!("/{name}");
    let record_path = format!("/{name}/{{id}}");
    let not_found = (404, spec.not_found_message());
    let bad_id = (400, "Malformed identifier or store failure".to_string());
    let not_ready = (503, "Document store not connected yet".to_string());

    vec![
        Endpoint {
            method: HttpMethod::Get,
            path: collection_path.clone(),
            tag: name,
            operation_id: format!("list_{name}"),
            summary: format!("List up to 50 {name}"),
            takes_id: false,
            body: None,
            responses: vec![
                (200, format!("Array of {name}")),
                (500, "Store failure".into()),
                not_ready.clone(),
            ],
        },
        Endpoint {
            method: HttpMethod::Post,
            path: collection_path,
            tag: name,
            operation_id: format!("create_{lower}"),
            summary: format!("Create a {lower}"),
            takes_id: false,
            body: Some(spec),
            responses: vec![
                (201, format!("Created {lower} with its generated `id`")),
                (400, "Malformed JSON body or store failure".into()),
                not_ready.clone(),
            ],
        },
        Endpoint {
            method: HttpMethod::Get,
            path: record_path.clone(),
            tag: name,
            operation_id: format!("get_{lower}"),
            summary: format!("Fetch a {lower} by id"),
            takes_id: true,
            body: None,
            responses: vec![
                (200, format!("The {lower}")),
                bad_id.clone(),
                not_found.clone(),
                not_ready.clone(),
            ],
        },
        Endpoint {
            method: HttpMethod::Put,
            path: record_path.clone(),
            tag: name,
            operation_id: format!("update_{lower}"),
            summary: format!("Replace the fields of a {lower}"),
            takes_id: true,
            body: Some(spec),
            responses: vec![
                (200, "`{\"status\": \"updated\"}`".into()),
                (400, "Malformed identifier or JSON body, or store failure".into()),
                not_found.clone(),
                not_ready.clone(),
            ],
        },
        Endpoint {
            method: HttpMethod::Delete,
            path: record_path,
            tag: name,
            operation_id: format!("delete_{lower}"),
            summary: format!("Delete a {lower}"),
            takes_id: true,
            body: None,
            responses: vec![
                (200, "`{\"status\": \"deleted\"}`".into()),
                bad_id,
                not_found,
                not_ready,
            ],
        },
    ]
}

fn field_schema(kind: FieldKind, example: &str) -> RefOr<Schema> {
    let builder = match kind {
        FieldKind::Text => ObjectBuilder::new()
            .schema_type(SchemaType::String)
            .example(Some(json!(example))),
        FieldKind::Number => ObjectBuilder::new()
            .schema_type(SchemaType::Number)
            .example(example.parse::<f64>().ok().map(|value| json!(value))),
        FieldKind::Reference => ObjectBuilder::new()
            .schema_type(SchemaType::String)
            .description(Some("Identifier of an exam; not checked for existence"))
            .example(Some(json!(example))),
    };
    RefOr::T(Schema::Object(builder.build()))
}

fn record_schema(spec: &CollectionSpec) -> RefOr<Schema> {
    let builder = spec.fields.iter().fold(
        ObjectBuilder::new().schema_type(SchemaType::Object),
        |builder, field| builder.property(field.name, field_schema(field.kind, field.example)),
    );
    RefOr::T(Schema::Object(builder.build()))
}

fn response_schema(endpoint: &Endpoint) -> Option<RefOr<Schema>> {
    let spec = COLLECTIONS
        .iter()
        .copied()
        .find(|spec| spec.name == endpoint.tag)?;
    match (endpoint.method, endpoint.takes_id) {
        (HttpMethod::Get, false) => Some(RefOr::T(Schema::Array(
            ArrayBuilder::new().items(record_schema(spec)).build(),
        ))),
        (HttpMethod::Get, true) => Some(record_schema(spec)),
        _ => None,
    }
}

/// Build the OpenAPI 3 document describing every route.
pub fn build_openapi() -> OpenApi {
    let mut items: BTreeMap<String, PathItemBuilder> = BTreeMap::new();

    for endpoint in endpoints() {
        let mut operation = OperationBuilder::new()
            .tags(Some([endpoint.tag.to_string()]))
            .operation_id(Some(endpoint.operation_id.clone()))
            .summary(Some(endpoint.summary.clone()));

        if endpoint.takes_id {
            operation = operation.parameter(
                ParameterBuilder::new()
                    .name("id")
                    .parameter_in(ParameterIn::Path)
                    .required(Required::True)
                    .description(Some("24-character hexadecimal ObjectId"))
                    .schema(Some(RefOr::T(Schema::Object(
                        ObjectBuilder::new().schema_type(SchemaType::String).build(),
                    )))),
            );
        }

        if let Some(spec) = endpoint.body {
            let body = RequestBodyBuilder::new()
                .content(
                    "application/json",
                    ContentBuilder::new().schema(record_schema(spec)).build(),
                )
                .required(Some(Required::True))
                .build();
            operation = operation.request_body(Some(body));
        }

        let success_schema = response_schema(&endpoint);
        for (status, description) in &endpoint.responses {
            let mut response = ResponseBuilder::new().description(description.clone());
            if let (200, Some(schema)) = (*status, &success_schema) {
                response = response.content(
                    "application/json",
                    ContentBuilder::new().schema(schema.clone()).build(),
                );
            }
            operation = operation.response(status.to_string(), response.build());
        }

        let item = items
            .remove(&endpoint.path)
            .unwrap_or_else(PathItemBuilder::new);
        items.insert(
            endpoint.path.clone(),
            item.operation(endpoint.method.path_item_type(), operation.build()),
        );
    }

    let paths = items
        .into_iter()
        .fold(utoipa::openapi::PathsBuilder::new(), |paths, (path, item)| {
            paths.path(path, item.build())
        });

    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title("Exams and Students Record Gateway")
                .version(env!("CARGO_PKG_VERSION"))
                .description(Some(
                    "CRUD API over the `exams` and `students` collections. Each student \
                     references one exam through `exam_id` (1:N, not enforced).",
                ))
                .build(),
        )
        .paths(paths.build())
        .build()
}

/// Swagger UI serving [`build_openapi`] at [`OPENAPI_PATH`].
///
/// Assets are embedded at build time, so the page works without network access.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_PATH, build_openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_every_collection_route() {
        let catalog = endpoints();
        for spec in COLLECTIONS {
            let collection_path = format!("/{}", spec.name);
            let record_path = format!("/{}/{{id}}", spec.name);
            let has = |method: HttpMethod, path: &str| {
                catalog
                    .iter()
                    .any(|endpoint| endpoint.method == method && endpoint.path == path)
            };
            assert!(has(HttpMethod::Get, &collection_path));
            assert!(has(HttpMethod::Post, &collection_path));
            assert!(has(HttpMethod::Get, &record_path));
            assert!(has(HttpMethod::Put, &record_path));
            assert!(has(HttpMethod::Delete, &record_path));
        }
        assert!(
            catalog
                .iter()
                .any(|endpoint| endpoint.path == "/init" && endpoint.method == HttpMethod::Get)
        );
    }

    #[test]
    fn openapi_document_lists_paths_and_methods() {
        let document = serde_json::to_value(build_openapi()).expect("serialize openapi");
        let paths = document["paths"].as_object().expect("paths object");

        assert!(paths.contains_key("/init"));
        let exams = &paths["/exams"];
        assert!(exams.get("get").is_some());
        assert!(exams.get("post").is_some());
        let exam = &paths["/exams/{id}"];
        assert!(exam.get("get").is_some());
        assert!(exam.get("put").is_some());
        assert!(exam.get("delete").is_some());
        assert_eq!(exam["delete"]["responses"]["404"]["description"], "Exam not found");
        assert_eq!(exam["get"]["tags"], serde_json::json!(["exams"]));
        assert_eq!(paths["/init"]["get"]["tags"], serde_json::json!(["service"]));

        let student_body =
            &paths["/students"]["post"]["requestBody"]["content"]["application/json"]["schema"];
        assert_eq!(student_body["properties"]["age"]["type"], "number");
        assert_eq!(student_body["properties"]["exam_id"]["type"], "string");
    }
}
