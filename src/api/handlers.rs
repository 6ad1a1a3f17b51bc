use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ReportConfig;
use crate::model::{FiltersApplied, ReportRequest, PROJECTS_COLLECTION};
use crate::report::{ReportError, ReportService};
use crate::store::traits::Store;

const SERVICE_NAME: &str = "project-report";

/// Settings the handlers need besides the store
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub report: ReportConfig,
    /// Record backend label for `/health`, e.g. `postgres` or `memory`
    pub database: String,
    pub bucket: Option<String>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            report: ReportConfig::default(),
            database: "memory".to_string(),
            bucket: None,
        }
    }
}

pub struct AppState<S: ?Sized> {
    pub store: Arc<S>,
    pub settings: Arc<ServiceSettings>,
}

impl<S: ?Sized> AppState<S> {
    pub fn new(store: Arc<S>, settings: ServiceSettings) -> Self {
        Self {
            store,
            settings: Arc::new(settings),
        }
    }
}

impl<S: ?Sized> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            settings: self.settings.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn internal_error(e: impl std::fmt::Display) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(&format!("Internal server error: {}", e))),
    )
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EndpointInfo {
    pub method: String,
    pub path: String,
    pub description: String,
}

pub async fn service_info() -> Json<ServiceInfo> {
    let endpoint = |method: &str, path: &str, description: &str| EndpointInfo {
        method: method.to_string(),
        path: path.to_string(),
        description: description.to_string(),
    };

    Json(ServiceInfo {
        service: SERVICE_NAME.to_string(),
        description: "Generates a Word report of student projects with team photos".to_string(),
        endpoints: vec![
            endpoint("GET", "/", "This description"),
            endpoint(
                "POST",
                "/",
                "Generate a report; optional body {\"status\": string, \"limit\": number}",
            ),
            endpoint("GET", "/health", "Service health"),
            endpoint("GET", "/test-database", "Probe the record store"),
            endpoint("GET", "/files/*path", "Download published files"),
        ],
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub service: String,
    pub database: String,
    pub bucket: Option<String>,
}

pub async fn health_check<S: Store + ?Sized>(State(state): State<AppState<S>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        service: SERVICE_NAME.to_string(),
        database: state.settings.database.clone(),
        bucket: state.settings.bucket.clone(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseProbeResponse {
    pub success: bool,
    pub message: String,
    pub projects_found: usize,
    pub sample_project_id: Option<String>,
}

pub async fn test_database<S: Store + ?Sized>(
    State(state): State<AppState<S>>,
) -> Result<Json<DatabaseProbeResponse>, ApiError> {
    let projects = state
        .store
        .list_records(PROJECTS_COLLECTION, None, Some(1))
        .await
        .map_err(|e| {
            log::error!("Record store probe failed: {:#}", e);
            internal_error(format!("{:#}", e))
        })?;

    Ok(Json(DatabaseProbeResponse {
        success: true,
        message: "Record store connection successful".to_string(),
        projects_found: projects.len(),
        sample_project_id: projects.first().map(|doc| doc.id.clone()),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateReportResponse {
    pub success: bool,
    pub message: String,
    pub download_url: String,
    pub filename: String,
    pub projects_count: usize,
    pub generated_at: String,
    pub filters_applied: FiltersApplied,
}

/// An empty body means no filter and the default limit
fn parse_request(body: &[u8]) -> Result<ReportRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ReportRequest::default());
    }

    serde_json::from_slice(body).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(&format!("Invalid request body: {}", e))),
        )
    })
}

pub async fn generate_report<S: Store + ?Sized>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> Result<Json<GenerateReportResponse>, ApiError> {
    let request = parse_request(&body)?;

    let service = ReportService::new(state.store.as_ref(), &state.settings.report);
    match service.generate(&request).await {
        Ok(outcome) => Ok(Json(GenerateReportResponse {
            success: true,
            message: format!(
                "Successfully generated report for {} projects",
                outcome.summary.projects
            ),
            download_url: outcome.download_url,
            filename: outcome.filename,
            projects_count: outcome.summary.projects,
            generated_at: outcome.generated_at,
            filters_applied: outcome.filters_applied,
        })),
        Err(ReportError::NoProjects) => {
            log::warn!("No projects matched {:?}", request);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(&ReportError::NoProjects.to_string())),
            ))
        }
        Err(e) => {
            log::error!("Report generation failed: {}", e);
            Err(internal_error(e))
        }
    }
}
