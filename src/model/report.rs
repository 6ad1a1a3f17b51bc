use serde::{Deserialize, Serialize};

/// Body of a report generation request; both fields are optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiltersApplied {
    pub status: Option<String>,
    pub limit: usize,
}

/// Counters collected while assembling a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblySummary {
    pub projects: usize,
    pub project_images: usize,
    pub student_photos: usize,
    pub missing_student_photos: usize,
}

/// A published report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportOutcome {
    pub download_url: String,
    pub filename: String,
    pub storage_path: String,
    pub generated_at: String,
    pub filters_applied: FiltersApplied,
    pub summary: AssemblySummary,
}
