use anyhow::{bail, Context, Result};
use project_report::config::AppConfig;
use project_report::model::Document;
use project_report::store::{PostgresStore, RecordStore};
use serde_json::{Map, Value};

/// Key under which an exported document carries its linked collections
const NESTED_COLLECTIONS: &str = "__collections__";

/// Flatten an export of the form
/// `{ "<collection>": { "<id>": { ..fields, "__collections__": {..} } } }`
/// into `(collection, document)` pairs. Linked collections land under
/// `<collection>/<id>/<name>`.
fn flatten_export(export: &Value) -> Result<Vec<(String, Document)>> {
    let Some(collections) = export.as_object() else {
        bail!("Export root must be an object of collections");
    };

    let mut records = Vec::new();
    for (collection, documents) in collections {
        flatten_collection(collection, documents, &mut records)?;
    }
    Ok(records)
}

fn flatten_collection(
    collection: &str,
    documents: &Value,
    records: &mut Vec<(String, Document)>,
) -> Result<()> {
    let documents = documents
        .as_object()
        .with_context(|| format!("Collection {} must be an object keyed by id", collection))?;

    for (id, data) in documents {
        let mut fields: Map<String, Value> = data
            .as_object()
            .with_context(|| format!("Record {}/{} must be an object", collection, id))?
            .clone();

        if let Some(nested) = fields.remove(NESTED_COLLECTIONS) {
            let nested = nested
                .as_object()
                .with_context(|| format!("{} of {}/{} must be an object", NESTED_COLLECTIONS, collection, id))?;
            for (name, children) in nested {
                flatten_collection(&format!("{}/{}/{}", collection, id, name), children, records)?;
            }
        }

        records.push((collection.to_string(), Document::new(id.clone(), Value::Object(fields))));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args()
        .nth(1)
        .context("Usage: import-records <export.json>")?;
    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {}", path))?;
    let export: Value = serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path))?;
    let records = flatten_export(&export)?;

    let config = AppConfig::load()?;
    let store = PostgresStore::new(
        &config.database_url()?,
        config.database.max_connections.unwrap_or(20),
    )
    .await?;
    store.migrate().await?;

    let total = records.len();
    log::info!("Importing {} records from {}", total, path);

    for (i, (collection, document)) in records.into_iter().enumerate() {
        if (i + 1) % 50 == 0 || i + 1 == total {
            log::info!("Importing record {}/{}: {}/{}", i + 1, total, collection, document.id);
        }
        store.upsert_record(&collection, document).await?;
    }

    log::info!("Import completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_export_with_linked_students() {
        let export = json!({
            "Teacher": {"t1": {"name": "Dr. Hina Baig"}},
            "projects": {
                "p1": {
                    "title": "Campus Navigator",
                    "__collections__": {
                        "students": {"s1": {"name": "Zara Noor"}}
                    }
                }
            }
        });

        let records = flatten_export(&export).unwrap();
        let keys: Vec<_> = records
            .iter()
            .map(|(collection, doc)| format!("{}:{}", collection, doc.id))
            .collect();

        assert_eq!(keys, vec!["Teacher:t1", "projects/p1/students:s1", "projects:p1"]);
        let project = &records[2].1;
        assert_eq!(project.data, json!({"title": "Campus Navigator"}));
    }

    #[test]
    fn test_flatten_export_rejects_non_object_records() {
        assert!(flatten_export(&json!({"projects": {"p1": 3}})).is_err());
        assert!(flatten_export(&json!([])).is_err());
    }
}
