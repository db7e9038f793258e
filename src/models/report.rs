use serde::{Deserialize, Serialize};

use crate::entities::reports::{self, ReportReason, ReportStatus};

/// A report that already passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReport {
    pub content_id: i32,
    pub content_title: String,
    pub reporter_email: Option<String>,
    pub reason: ReportReason,
    pub description: String,
    pub page_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: i32,
    pub content_id: i32,
    pub content_title: String,
    pub reporter_email: Option<String>,
    pub reason: ReportReason,
    pub reason_label: &'static str,
    pub description: String,
    pub page_url: String,
    pub status: ReportStatus,
    pub admin_notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<reports::Model> for Report {
    fn from(model: reports::Model) -> Self {
        Self {
            id: model.id,
            content_id: model.content_id,
            content_title: model.content_title,
            reporter_email: model.reporter_email,
            reason: model.reason,
            reason_label: model.reason.label_arabic(),
            description: model.description,
            page_url: model.page_url,
            status: model.status,
            admin_notes: model.admin_notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReasonOption {
    pub code: &'static str,
    pub label: &'static str,
}

#[must_use]
pub fn reason_options() -> Vec<ReasonOption> {
    ReportReason::ALL
        .into_iter()
        .map(|reason| ReasonOption {
            code: reason.code(),
            label: reason.label_arabic(),
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPage {
    pub reports: Vec<Report>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes_round_trip_through_parse() {
        for reason in ReportReason::ALL {
            assert_eq!(ReportReason::parse(reason.code()), Some(reason));
        }
        assert_eq!(ReportReason::parse("spam"), None);
        assert_eq!(ReportReason::parse(""), None);
    }

    #[test]
    fn test_reason_options_carry_arabic_labels() {
        let options = reason_options();
        assert_eq!(options.len(), 10);
        let download = options.iter().find(|o| o.code == "download-link").unwrap();
        assert_eq!(download.label, "مشكلة في رابط التحميل المباشر");
    }

    #[test]
    fn test_status_parse_accepts_both_separators() {
        assert_eq!(
            ReportStatus::parse("in-progress"),
            Some(ReportStatus::InProgress)
        );
        assert_eq!(
            ReportStatus::parse("in_progress"),
            Some(ReportStatus::InProgress)
        );
        assert_eq!(ReportStatus::parse("closed"), None);
    }
}
