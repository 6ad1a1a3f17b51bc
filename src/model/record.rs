use crate::model::Id;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PROJECTS_COLLECTION: &str = "projects";
pub const TEACHERS_COLLECTION: &str = "Teacher";

/// Linked collection holding the students of a single project
pub fn students_collection(project_id: &str) -> String {
    format!("{}/{}/students", PROJECTS_COLLECTION, project_id)
}

/// A keyed record as returned by the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Id,
    pub data: Value,
}

impl Document {
    pub fn new(id: impl Into<Id>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// String field lookup; non-string values count as absent
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

/// Equality filter on a top-level record field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub field: String,
    pub value: String,
}

impl RecordFilter {
    pub fn field_equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, document: &Document) -> bool {
        document.get_str(&self.field) == Some(self.value.as_str())
    }
}
