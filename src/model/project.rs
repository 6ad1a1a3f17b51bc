use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::model::{Document, Id, NOT_AVAILABLE};

const DEFAULT_STUDENT_NAME: &str = "Unknown";
const DEFAULT_STUDENT_ROLE: &str = "Student";

/// Project as stored in the `projects` collection.
///
/// Every field except the id is optional in storage; missing keys fall back
/// to their defaults here instead of being probed at use sites.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    /// Always taken from the document key
    #[serde(skip_deserializing)]
    pub id: Id,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// URL-encoded storage path or full download URL of the lead image
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "embedded_students")]
    pub students: Vec<StudentRecord>,
    #[serde(default)]
    pub supervisor_id: Option<String>,
    #[serde(default)]
    pub co_supervisor_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProjectRecord {
    /// Decode a stored record; the document key always wins over any `id` field
    pub fn from_document(document: &Document) -> Result<Self> {
        let mut project: ProjectRecord = serde_json::from_value(document.data.clone())
            .with_context(|| format!("Failed to decode project {}", document.id))?;
        project.id = document.id.clone();
        Ok(project)
    }

    /// Title used for matching; blank titles count as absent
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn display_title(&self) -> &str {
        self.title_text().unwrap_or("Untitled Project")
    }

    pub fn display_description(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("No description available")
    }

    pub fn image_reference(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub name: String,
    pub email: String,
    pub role: String,
}

impl StudentRecord {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role: role.into(),
        }
    }

    /// Lenient extraction: non-object values are rejected, missing or
    /// non-string fields take their defaults
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let field = |key: &str| object.get(key).and_then(Value::as_str);

        Some(Self {
            name: field("name").unwrap_or(DEFAULT_STUDENT_NAME).to_string(),
            email: field("email").unwrap_or_default().to_string(),
            role: field("role").unwrap_or(DEFAULT_STUDENT_ROLE).to_string(),
        })
    }

    pub fn display_email(&self) -> &str {
        if self.email.is_empty() {
            NOT_AVAILABLE
        } else {
            &self.email
        }
    }
}

/// A project ready for the report: students resolved from whichever
/// location held them and supervisor ids replaced with display names
#[derive(Debug, Clone, PartialEq)]
pub struct ReportProject {
    pub project: ProjectRecord,
    pub students: Vec<StudentRecord>,
    pub supervisor_name: String,
    pub co_supervisor_name: String,
}

impl ReportProject {
    pub fn new(project: ProjectRecord) -> Self {
        let students = project.students.clone();
        Self {
            project,
            students,
            supervisor_name: NOT_AVAILABLE.to_string(),
            co_supervisor_name: NOT_AVAILABLE.to_string(),
        }
    }

    /// Creation time as shown in the report, `None` when unknown
    pub fn created_at_display(&self) -> Option<String> {
        self.project
            .created_at
            .map(|ts| ts.format("%B %d, %Y at %I:%M %p").to_string())
    }
}

fn embedded_students<'de, D>(deserializer: D) -> Result<Vec<StudentRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let students = match value {
        Some(Value::Array(items)) => items.iter().filter_map(StudentRecord::from_value).collect(),
        _ => Vec::new(),
    };
    Ok(students)
}

/// Accepts RFC 3339 strings and `{seconds, nanos}` objects (with or without
/// leading underscores); anything else is treated as missing
fn flexible_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_timestamp))
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|ts| ts.with_timezone(&Utc)),
        Value::Object(map) => {
            let seconds = map
                .get("seconds")
                .or_else(|| map.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = map
                .get("nanos")
                .or_else(|| map.get("nanoseconds"))
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, u32::try_from(nanos).ok()?).single()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_take_defaults() {
        let doc = Document::new("proj-1", json!({}));
        let project = ProjectRecord::from_document(&doc).unwrap();

        assert_eq!(project.id, "proj-1");
        assert_eq!(project.title, None);
        assert_eq!(project.display_title(), "Untitled Project");
        assert_eq!(project.display_description(), "No description available");
        assert!(project.students.is_empty());
        assert_eq!(project.created_at, None);
    }

    #[test]
    fn test_embedded_students_skip_non_objects() {
        let doc = Document::new(
            "proj-2",
            json!({
                "title": "Smart Irrigation",
                "students": [
                    {"name": "Ali Khan", "email": "ali@example.com"},
                    "not-a-student",
                    {"role": "Lead"}
                ]
            }),
        );
        let project = ProjectRecord::from_document(&doc).unwrap();

        assert_eq!(
            project.students,
            vec![
                StudentRecord::new("Ali Khan", "ali@example.com", "Student"),
                StudentRecord::new("Unknown", "", "Lead"),
            ]
        );
    }

    #[test]
    fn test_students_field_of_wrong_shape_is_ignored() {
        let doc = Document::new("proj-3", json!({"students": "Ali, Sara"}));
        let project = ProjectRecord::from_document(&doc).unwrap();
        assert!(project.students.is_empty());
    }

    #[test]
    fn test_document_id_overrides_stored_id() {
        let doc = Document::new("real-id", json!({"id": "stale-id", "imageUrl": "projects%2Fa.jpg"}));
        let project = ProjectRecord::from_document(&doc).unwrap();

        assert_eq!(project.id, "real-id");
        assert_eq!(project.image_reference(), Some("projects%2Fa.jpg"));
    }

    #[test]
    fn test_stored_id_of_any_type_is_ignored() {
        let doc = Document::new("real-id", json!({"id": 17, "title": "Solar Tracker"}));
        let project = ProjectRecord::from_document(&doc).unwrap();

        assert_eq!(project.id, "real-id");
        assert_eq!(project.display_title(), "Solar Tracker");
    }

    #[test]
    fn test_timestamp_formats() {
        let rfc = Document::new("a", json!({"createdAt": "2025-07-14T09:30:00Z"}));
        let seconds = Document::new("b", json!({"createdAt": {"_seconds": 1752485400, "_nanoseconds": 0}}));
        let garbage = Document::new("c", json!({"createdAt": true}));

        let rfc = ReportProject::new(ProjectRecord::from_document(&rfc).unwrap());
        let seconds = ReportProject::new(ProjectRecord::from_document(&seconds).unwrap());
        let garbage = ProjectRecord::from_document(&garbage).unwrap();

        assert_eq!(
            rfc.created_at_display().as_deref(),
            Some("July 14, 2025 at 09:30 AM")
        );
        assert_eq!(rfc.project.created_at, seconds.project.created_at);
        assert_eq!(garbage.created_at, None);
    }

    #[test]
    fn test_blank_title_and_image_reference_are_absent() {
        let doc = Document::new("p", json!({"title": "   ", "imageUrl": ""}));
        let project = ProjectRecord::from_document(&doc).unwrap();

        assert_eq!(project.title_text(), None);
        assert_eq!(project.image_reference(), None);
    }
}
