use chrono::{DateTime, Local};

use crate::config::ReportConfig;
use crate::model::{
    students_collection, Document, FiltersApplied, ProjectRecord, RecordFilter, ReportOutcome,
    ReportProject, ReportRequest, StudentRecord, NOT_AVAILABLE, PROJECTS_COLLECTION,
    TEACHERS_COLLECTION,
};
use crate::report::assembler::{render_report, ReportAssembler};
use crate::report::document::DocumentBuilder;
use crate::report::docx::{DocxReport, DOCX_CONTENT_TYPE};
use crate::report::error::ReportError;
use crate::store::traits::Store;

/// `All_Projects_Report_<YYYYMMDD_HHMMSS>.docx`
pub fn report_filename(at: DateTime<Local>) -> String {
    format!("All_Projects_Report_{}.docx", at.format("%Y%m%d_%H%M%S"))
}

/// Runs one report request end to end: fetch, assemble, publish
pub struct ReportService<'a, S: Store + ?Sized> {
    store: &'a S,
    config: &'a ReportConfig,
}

impl<'a, S: Store + ?Sized> ReportService<'a, S> {
    pub fn new(store: &'a S, config: &'a ReportConfig) -> Self {
        Self { store, config }
    }

    pub async fn generate(&self, request: &ReportRequest) -> Result<ReportOutcome, ReportError> {
        let request_id = crate::model::generate_id();
        let limit = request.limit.unwrap_or(self.config.default_limit);
        log::info!(
            "[{}] Generating report (status={:?}, limit={})",
            request_id,
            request.status,
            limit
        );

        let projects = self
            .fetch_projects(request.status.as_deref(), limit)
            .await
            .map_err(ReportError::Fetch)?;
        if projects.is_empty() {
            return Err(ReportError::NoProjects);
        }

        let (prepared, summary) = ReportAssembler::new(self.store).prepare(projects).await;

        let now = Local::now();
        let mut document = DocxReport::new();
        render_report(&prepared, &now.format("%B %d, %Y").to_string(), &mut document);
        let bytes = document.finish().map_err(ReportError::Document)?;

        let filename = report_filename(now);
        let storage_path = format!(
            "{}/{}",
            self.config.documents_prefix.trim_end_matches('/'),
            filename
        );
        let download_url = self
            .store
            .put_blob(&storage_path, bytes, DOCX_CONTENT_TYPE)
            .await
            .map_err(ReportError::Publish)?;

        log::info!(
            "[{}] Published {} ({} projects, {} project images, {} student photos)",
            request_id,
            storage_path,
            summary.projects,
            summary.project_images,
            summary.student_photos
        );

        Ok(ReportOutcome {
            download_url,
            filename,
            storage_path,
            generated_at: Local::now().to_rfc3339(),
            filters_applied: FiltersApplied {
                status: request.status.clone(),
                limit,
            },
            summary,
        })
    }

    /// Projects matching the filter, with students and supervisor names
    /// filled in. An empty status means no filter. A project that fails to
    /// decode is skipped; only a failed listing is an error.
    pub async fn fetch_projects(
        &self,
        status: Option<&str>,
        limit: usize,
    ) -> anyhow::Result<Vec<ReportProject>> {
        let filter = status
            .filter(|s| !s.is_empty())
            .map(|s| RecordFilter::field_equals("status", s));
        let documents = self
            .store
            .list_records(PROJECTS_COLLECTION, filter.as_ref(), Some(limit))
            .await?;

        let mut projects = Vec::with_capacity(documents.len());
        for document in &documents {
            match self.load_project(document).await {
                Ok(project) => projects.push(project),
                Err(e) => log::error!("Error processing project {}: {:#}", document.id, e),
            }
        }

        log::info!("Fetched {} projects", projects.len());
        Ok(projects)
    }

    async fn load_project(&self, document: &Document) -> anyhow::Result<ReportProject> {
        let project = ProjectRecord::from_document(document)?;
        let mut report_project = ReportProject::new(project);

        if report_project.students.is_empty() {
            report_project.students = self.linked_students(&report_project.project.id).await;
        }
        report_project.supervisor_name =
            self.teacher_name(report_project.project.supervisor_id.as_deref()).await;
        report_project.co_supervisor_name =
            self.teacher_name(report_project.project.co_supervisor_id.as_deref()).await;

        Ok(report_project)
    }

    async fn linked_students(&self, project_id: &str) -> Vec<StudentRecord> {
        match self
            .store
            .list_records(&students_collection(project_id), None, None)
            .await
        {
            Ok(documents) => documents
                .iter()
                .filter_map(|doc| StudentRecord::from_value(&doc.data))
                .collect(),
            Err(e) => {
                log::warn!("Error fetching students for project {}: {:#}", project_id, e);
                Vec::new()
            }
        }
    }

    async fn teacher_name(&self, teacher_id: Option<&str>) -> String {
        let Some(teacher_id) = teacher_id.filter(|id| !id.is_empty()) else {
            return NOT_AVAILABLE.to_string();
        };

        match self.store.get_record(TEACHERS_COLLECTION, teacher_id).await {
            Ok(Some(teacher)) => teacher.get_str("name").unwrap_or(NOT_AVAILABLE).to_string(),
            Ok(None) => NOT_AVAILABLE.to_string(),
            Err(e) => {
                log::warn!("Error fetching supervisor {}: {:#}", teacher_id, e);
                NOT_AVAILABLE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use serde_json::json;

    fn config() -> ReportConfig {
        ReportConfig {
            default_limit: 100,
            documents_prefix: "documents".to_string(),
        }
    }

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::with_public_base_url("https://files.example.com");
        store.insert_record(TEACHERS_COLLECTION, Document::new("t1", json!({"name": "Dr. Ayesha Siddiqui"})));
        store.insert_record(
            PROJECTS_COLLECTION,
            Document::new(
                "p1",
                json!({
                    "title": "Smart Irrigation",
                    "status": "approved",
                    "supervisorId": "t1",
                    "coSupervisorId": "missing-teacher",
                    "students": [{"name": "Ali Khan", "email": "ali@example.com"}]
                }),
            ),
        );
        store.insert_record(
            PROJECTS_COLLECTION,
            Document::new("p2", json!({"title": "Line Follower", "status": "draft"})),
        );
        store.insert_record(
            &students_collection("p2"),
            Document::new("s1", json!({"name": "Sara Malik", "role": "Lead"})),
        );
        store
    }

    #[test]
    fn test_report_filename() {
        let at = Local.with_ymd_and_hms(2025, 7, 14, 9, 5, 3).unwrap();
        assert_eq!(report_filename(at), "All_Projects_Report_20250714_090503.docx");
    }

    #[tokio::test]
    async fn test_fetch_projects_resolves_students_and_supervisors() {
        let store = seeded_store();
        let config = config();
        let service = ReportService::new(&store, &config);

        let projects = service.fetch_projects(None, 10).await.unwrap();

        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].supervisor_name, "Dr. Ayesha Siddiqui");
        assert_eq!(projects[0].co_supervisor_name, NOT_AVAILABLE);
        assert_eq!(projects[0].students[0].name, "Ali Khan");
        assert_eq!(
            projects[1].students,
            vec![StudentRecord::new("Sara Malik", "", "Lead")]
        );
        assert_eq!(projects[1].supervisor_name, NOT_AVAILABLE);
    }

    #[tokio::test]
    async fn test_fetch_projects_applies_status_and_limit() {
        let store = seeded_store();
        let config = config();
        let service = ReportService::new(&store, &config);

        let drafts = service.fetch_projects(Some("draft"), 10).await.unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].project.id, "p2");

        assert_eq!(service.fetch_projects(None, 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_status_means_no_filter() {
        let store = seeded_store();
        let config = config();
        let request = ReportRequest {
            status: Some(String::new()),
            limit: None,
        };

        let outcome = ReportService::new(&store, &config).generate(&request).await.unwrap();

        assert_eq!(outcome.summary.projects, 2);
        assert_eq!(outcome.filters_applied.status.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_undecodable_project_is_skipped() {
        let store = seeded_store();
        store.insert_record(PROJECTS_COLLECTION, Document::new("p0", json!({"title": 42})));
        let config = config();

        let projects = ReportService::new(&store, &config)
            .fetch_projects(None, 10)
            .await
            .unwrap();

        let ids: Vec<_> = projects.iter().map(|p| p.project.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_generate_publishes_document() {
        let store = seeded_store();
        let config = config();
        let request = ReportRequest {
            status: Some("approved".to_string()),
            limit: None,
        };

        let outcome = ReportService::new(&store, &config).generate(&request).await.unwrap();

        assert!(outcome.filename.starts_with("All_Projects_Report_"));
        assert!(outcome.filename.ends_with(".docx"));
        assert_eq!(outcome.storage_path, format!("documents/{}", outcome.filename));
        assert_eq!(
            outcome.download_url,
            format!("https://files.example.com/documents/{}", outcome.filename)
        );
        assert_eq!(outcome.filters_applied.limit, 100);
        assert_eq!(outcome.summary.projects, 1);

        let blob = store.blob(&outcome.storage_path).unwrap();
        assert_eq!(blob.content_type, DOCX_CONTENT_TYPE);
        assert!(blob.bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_generate_without_matches_fails() {
        let store = seeded_store();
        let config = config();
        let request = ReportRequest {
            status: Some("archived".to_string()),
            limit: Some(5),
        };

        let err = ReportService::new(&store, &config)
            .generate(&request)
            .await
            .unwrap_err();

        assert!(matches!(err, ReportError::NoProjects));
        assert_eq!(err.to_string(), "No projects found with the specified criteria");
    }
}
