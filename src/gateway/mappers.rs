//! Conversions between request JSON and stored BSON documents.

use crate::gateway::types::GatewayError;
use mongodb::bson::{self, Bson, Document};
use serde_json::{Map, Value};

/// Render a stored document as JSON, with ObjectIds flattened to their hex strings.
pub(crate) fn document_to_json(document: Document) -> Value {
    Value::Object(
        document
            .into_iter()
            .map(|(key, value)| (key, bson_to_json(value)))
            .collect(),
    )
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(id) => Value::String(id.to_hex()),
        Bson::Document(inner) => document_to_json(inner),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

/// Encode projected request fields as a BSON document.
pub(crate) fn fields_to_document(fields: &Map<String, Value>) -> Result<Document, GatewayError> {
    let mut document = Document::new();
    for (key, value) in fields {
        let encoded =
            bson::to_bson(value).map_err(|err| GatewayError::InvalidPayload(err.to_string()))?;
        document.insert(key.clone(), encoded);
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId};
    use serde_json::json;

    #[test]
    fn object_ids_render_as_hex_strings() {
        let id = ObjectId::new();
        let exam_id = ObjectId::new();
        let rendered = document_to_json(doc! {
            "_id": id,
            "name": "Student1",
            "age": 19,
            "exam_id": exam_id,
            "history": [exam_id],
        });

        assert_eq!(rendered["_id"], json!(id.to_hex()));
        assert_eq!(rendered["name"], "Student1");
        assert_eq!(rendered["age"], 19);
        assert_eq!(rendered["exam_id"], json!(exam_id.to_hex()));
        assert_eq!(rendered["history"][0], json!(exam_id.to_hex()));
    }

    #[test]
    fn fields_encode_json_scalars() {
        let Value::Object(fields) = json!({ "name": "X", "age": 30, "exam_id": null }) else {
            unreachable!()
        };
        let document = fields_to_document(&fields).expect("encode");

        assert_eq!(document.get_str("name").expect("name"), "X");
        assert!(matches!(
            document.get("age"),
            Some(Bson::Int32(30) | Bson::Int64(30))
        ));
        assert_eq!(document.get("exam_id"), Some(&Bson::Null));
    }
}
