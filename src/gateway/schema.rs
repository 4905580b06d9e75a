//! Collection descriptors shared by routing, persistence, and documentation.

use serde_json::{Map, Value};

/// JSON shape of a declared field, used for the generated API documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free-form string.
    Text,
    /// JSON number.
    Number,
    /// Identifier of a record in another collection, carried as a string.
    Reference,
}

/// Declared field of a collection.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Key under which the value is stored.
    pub name: &'static str,
    /// Expected JSON shape.
    pub kind: FieldKind,
    /// Sample value used in documentation.
    pub example: &'static str,
}

/// Static description of one collection exposed by the gateway.
#[derive(Debug)]
pub struct CollectionSpec {
    /// Collection name in the store and route prefix (`/exams`).
    pub name: &'static str,
    /// Singular label used in messages (`Exam not found`).
    pub kind: &'static str,
    /// Fields accepted on create and replaced on update.
    pub fields: &'static [FieldSpec],
}

/// Clinical exams.
pub static EXAMS: CollectionSpec = CollectionSpec {
    name: "exams",
    kind: "Exam",
    fields: &[
        FieldSpec {
            name: "type",
            kind: FieldKind::Text,
            example: "blood",
        },
        FieldSpec {
            name: "specialty",
            kind: FieldKind::Text,
            example: "hematology",
        },
        FieldSpec {
            name: "date",
            kind: FieldKind::Text,
            example: "2025-01-01",
        },
    ],
};

/// Students, each pointing at one exam through `exam_id`.
pub static STUDENTS: CollectionSpec = CollectionSpec {
    name: "students",
    kind: "Student",
    fields: &[
        FieldSpec {
            name: "name",
            kind: FieldKind::Text,
            example: "Student1",
        },
        FieldSpec {
            name: "age",
            kind: FieldKind::Number,
            example: "19",
        },
        FieldSpec {
            name: "exam_id",
            kind: FieldKind::Reference,
            example: "652f1c2e9b1e8a3d4c5b6a70",
        },
    ],
};

/// Every collection served by the gateway, in route registration order.
pub static COLLECTIONS: [&CollectionSpec; 2] = [&EXAMS, &STUDENTS];

impl CollectionSpec {
    /// Message returned when an identifier matches no document.
    pub fn not_found_message(&self) -> String {
        format!("{} not found", self.kind)
    }

    /// Keep only the declared fields of `body`, filling missing ones with `null`.
    pub fn project(&self, body: &Map<String, Value>) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|field| {
                let value = body.get(field.name).cloned().unwrap_or(Value::Null);
                (field.name.to_string(), value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn project_drops_extra_fields_and_nulls_missing_ones() {
        let body = json!({ "type": "A", "date": "2025-01-01", "rogue": true });
        let Value::Object(body) = body else {
            unreachable!()
        };

        let projected = EXAMS.project(&body);
        assert_eq!(projected.len(), 3);
        assert_eq!(projected["type"], "A");
        assert_eq!(projected["specialty"], Value::Null);
        assert_eq!(projected["date"], "2025-01-01");
        assert!(!projected.contains_key("rogue"));
    }

    #[test]
    fn not_found_message_uses_singular_label() {
        assert_eq!(EXAMS.not_found_message(), "Exam not found");
        assert_eq!(STUDENTS.not_found_message(), "Student not found");
    }

    #[test]
    fn collections_are_registered_in_order() {
        let names: Vec<_> = COLLECTIONS.iter().map(|spec| spec.name).collect();
        assert_eq!(names, ["exams", "students"]);
    }
}
