use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::prelude::*;
use crate::entities::reports::{self, ReportStatus};
use crate::models::content::{clamp_limit, clamp_page};
use crate::models::report::{NewReport, ReportFilter};

pub struct ReportRepository {
    conn: DatabaseConnection,
}

impl ReportRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, report: &NewReport) -> Result<reports::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = reports::ActiveModel {
            content_id: Set(report.content_id),
            content_title: Set(report.content_title.clone()),
            reporter_email: Set(report.reporter_email.clone()),
            reason: Set(report.reason),
            description: Set(report.description.clone()),
            page_url: Set(report.page_url.clone()),
            status: Set(ReportStatus::Pending),
            admin_notes: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert report")
    }

    /// Newest first. Returns the page and the size of the filtered set.
    pub async fn list(&self, filter: &ReportFilter) -> Result<(Vec<reports::Model>, u64)> {
        let mut query = Reports::find();
        if let Some(status) = filter.status {
            query = query.filter(reports::Column::Status.eq(status));
        }

        let paginator = query
            .order_by_desc(reports::Column::CreatedAt)
            .order_by_desc(reports::Column::Id)
            .paginate(&self.conn, clamp_limit(Some(filter.limit)));

        let total = paginator
            .num_items()
            .await
            .context("Failed to count reports")?;
        let rows = paginator
            .fetch_page(clamp_page(Some(filter.page)) - 1)
            .await
            .context("Failed to fetch reports page")?;

        Ok((rows, total))
    }

    pub async fn update_status(
        &self,
        id: i32,
        status: ReportStatus,
        admin_notes: Option<String>,
    ) -> Result<Option<reports::Model>> {
        let Some(existing) = Reports::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query report by ID")?
        else {
            return Ok(None);
        };

        let mut active: reports::ActiveModel = existing.into();
        active.status = Set(status);
        if admin_notes.is_some() {
            active.admin_notes = Set(admin_notes);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update report status")?;
        Ok(Some(updated))
    }

    pub async fn count(&self) -> Result<u64> {
        Reports::find()
            .count(&self.conn)
            .await
            .context("Failed to count reports")
    }

    pub async fn count_with_status(&self, status: ReportStatus) -> Result<u64> {
        Reports::find()
            .filter(reports::Column::Status.eq(status))
            .count(&self.conn)
            .await
            .context("Failed to count reports by status")
    }
}
