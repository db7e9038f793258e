//! Domain service for user-submitted problem reports.

use thiserror::Error;

use crate::entities::reports::ReportStatus;
use crate::models::report::{NewReport, Report, ReportFilter, ReportPage};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Report {0} not found")]
    NotFound(i32),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for ReportError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ReportError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[async_trait::async_trait]
pub trait ReportService: Send + Sync {
    /// Persists an already validated report with status `pending`. The content
    /// title is taken from the catalog when the item exists.
    async fn submit(&self, report: NewReport) -> Result<Report, ReportError>;

    async fn list(&self, filter: ReportFilter) -> Result<ReportPage, ReportError>;

    /// # Errors
    ///
    /// Returns [`ReportError::NotFound`] if no report has this id.
    async fn update_status(
        &self,
        id: i32,
        status: ReportStatus,
        admin_notes: Option<String>,
    ) -> Result<Report, ReportError>;
}
