use crate::model::{students_collection, Document, Id, PROJECTS_COLLECTION, TEACHERS_COLLECTION};
use crate::store::traits::RecordStore;
use anyhow::{Context, Result};
use serde_json::{json, Value};

/// Demo teachers, projects and one linked student collection
pub async fn load_seed_data<S: RecordStore + ?Sized>(store: &S) -> Result<()> {
    load_teachers(store).await?;
    load_projects(store).await?;
    load_linked_students(store).await?;

    log::info!("Seed data loaded");
    Ok(())
}

async fn upsert_all<S: RecordStore + ?Sized>(
    store: &S,
    collection: &str,
    records: Vec<(Id, Value)>,
) -> Result<()> {
    let count = records.len();
    for (id, data) in records {
        store
            .upsert_record(collection, Document::new(id.clone(), data))
            .await
            .with_context(|| format!("Failed to seed {}/{}", collection, id))?;
    }
    log::debug!("Seeded {} records into {}", count, collection);
    Ok(())
}

async fn load_teachers<S: RecordStore + ?Sized>(store: &S) -> Result<()> {
    upsert_all(
        store,
        TEACHERS_COLLECTION,
        vec![
            ("teacher-001".into(), json!({"name": "Dr. Ayesha Siddiqui", "email": "ayesha.siddiqui@example.edu"})),
            ("teacher-002".into(), json!({"name": "Prof. Imran Qureshi", "email": "imran.qureshi@example.edu"})),
            ("teacher-003".into(), json!({"name": "Dr. Hina Baig"})),
        ],
    )
    .await
}

async fn load_projects<S: RecordStore + ?Sized>(store: &S) -> Result<()> {
    upsert_all(
        store,
        PROJECTS_COLLECTION,
        vec![
            (
                "proj-smart-irrigation".into(),
                json!({
                    "title": "Smart Irrigation System",
                    "description": "Soil moisture sensors drive a drip irrigation controller over LoRa.",
                    "status": "approved",
                    "supervisorId": "teacher-001",
                    "coSupervisorId": "teacher-002",
                    "createdAt": "2024-09-12T10:30:00Z",
                    "students": [
                        {"name": "Ali Khan", "email": "ali.khan@example.edu", "role": "Team Lead"},
                        {"name": "Sara Malik", "email": "sara.malik@example.edu"},
                        {"name": "Omar Farooq"}
                    ]
                }),
            ),
            (
                "proj-line-follower".into(),
                json!({
                    "title": "Line Follower Robot",
                    "description": "PID-tuned robot following a track with IR sensors.",
                    "status": "in_progress",
                    "supervisorId": "teacher-003",
                    "createdAt": {"seconds": 1717236000, "nanoseconds": 0}
                }),
            ),
            (
                "proj-campus-navigator".into(),
                json!({
                    "title": "Campus Navigator",
                    "status": "approved",
                    "supervisorId": "teacher-002",
                    "students": []
                }),
            ),
        ],
    )
    .await
}

async fn load_linked_students<S: RecordStore + ?Sized>(store: &S) -> Result<()> {
    upsert_all(
        store,
        &students_collection("proj-line-follower"),
        vec![
            ("student-001".into(), json!({"name": "Zara Noor", "email": "zara.noor@example.edu", "role": "Developer"})),
            ("student-002".into(), json!({"name": "Bilal Aziz", "role": "Hardware"})),
        ],
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProjectRecord;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_seed_records_decode() {
        let store = MemoryStore::new();
        load_seed_data(&store).await.unwrap();

        let projects = store.list_records(PROJECTS_COLLECTION, None, None).await.unwrap();
        assert_eq!(projects.len(), 3);
        for document in &projects {
            ProjectRecord::from_document(document).unwrap();
        }

        let linked = store
            .list_records(&students_collection("proj-line-follower"), None, None)
            .await
            .unwrap();
        assert_eq!(linked.len(), 2);
    }
}
