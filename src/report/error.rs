use thiserror::Error;

/// Failures that abort a report request. Per-image problems never get
/// here; they degrade to placeholders during assembly.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No projects found with the specified criteria")]
    NoProjects,

    #[error("Failed to fetch projects: {0:#}")]
    Fetch(#[source] anyhow::Error),

    #[error("Failed to build report document: {0:#}")]
    Document(#[source] anyhow::Error),

    #[error("Failed to publish report: {0:#}")]
    Publish(#[source] anyhow::Error),
}
