//! `SeaORM` implementation of the `ReportService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::QueryCache;
use crate::constants::cache_keys;
use crate::db::Store;
use crate::entities::reports::ReportStatus;
use crate::models::report::{NewReport, Report, ReportFilter, ReportPage};
use crate::services::report_service::{ReportError, ReportService};

pub struct SeaOrmReportService {
    store: Store,
    cache: Arc<QueryCache>,
}

impl SeaOrmReportService {
    #[must_use]
    pub const fn new(store: Store, cache: Arc<QueryCache>) -> Self {
        Self { store, cache }
    }
}

#[async_trait]
impl ReportService for SeaOrmReportService {
    async fn submit(&self, mut report: NewReport) -> Result<Report, ReportError> {
        // Stored title wins. Unknown ids keep the submitted one.
        match self.store.get_content(report.content_id).await {
            Ok(Some(content)) => report.content_title = content.title,
            Ok(None) => {}
            Err(e) => warn!(
                content_id = report.content_id,
                error = %e,
                "Could not look up reported content title"
            ),
        }

        let saved = self.store.insert_report(&report).await?;

        // Dashboard carries report counts.
        self.cache.clear(Some(cache_keys::DASHBOARD_STATS)).await;

        info!(
            event = "report_submitted",
            report_id = saved.id,
            content_id = saved.content_id,
            reason = saved.reason.code(),
            "Report received"
        );
        Ok(Report::from(saved))
    }

    async fn list(&self, filter: ReportFilter) -> Result<ReportPage, ReportError> {
        let (rows, total) = self.store.list_reports(&filter).await?;

        Ok(ReportPage {
            reports: rows.into_iter().map(Report::from).collect(),
            total,
            page: filter.page,
            limit: filter.limit,
            total_pages: if filter.limit == 0 {
                0
            } else {
                total.div_ceil(filter.limit)
            },
        })
    }

    async fn update_status(
        &self,
        id: i32,
        status: ReportStatus,
        admin_notes: Option<String>,
    ) -> Result<Report, ReportError> {
        let updated = self
            .store
            .update_report_status(id, status, admin_notes)
            .await?
            .ok_or(ReportError::NotFound(id))?;

        self.cache.clear(Some(cache_keys::DASHBOARD_STATS)).await;

        info!(report_id = id, status = ?status, "Report status updated");
        Ok(Report::from(updated))
    }
}
