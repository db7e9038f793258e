use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{ReportRequest, validate_page, validate_report};
use super::{ApiError, ApiResponse, AppState, ReportCreated};
use crate::constants::messages;
use crate::entities::reports::ReportStatus;
use crate::models::content::{clamp_limit, clamp_page};
use crate::models::report::{ReasonOption, Report, ReportFilter, ReportPage, reason_options};

#[derive(Debug, Default, Deserialize)]
pub struct ReportListQuery {
    pub status: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: String,
    #[serde(default)]
    pub admin_notes: Option<String>,
}

/// Accepts a problem report from a visitor. Nothing is stored unless every
/// field validates.
///
/// # Endpoint
/// `POST /api/reports`
pub async fn submit_report(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ReportCreated>>), ApiError> {
    let Json(request) = payload?;
    let report = validate_report(request)?;

    let saved = state.report_service().submit(report).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            ReportCreated {
                report_id: saved.id,
            },
            messages::REPORT_RECEIVED,
        )),
    ))
}

/// # Endpoint
/// `GET /api/reports/reasons`
pub async fn list_reasons() -> Json<ApiResponse<Vec<ReasonOption>>> {
    Json(ApiResponse::success(reason_options()))
}

/// Admin only.
///
/// # Endpoint
/// `GET /api/reports`
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ReportListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<ReportPage>>, ApiError> {
    let Query(query) = query?;

    let status = match query.status.as_deref().map(str::trim) {
        None | Some("" | "all") => None,
        Some(raw) => Some(
            ReportStatus::parse(raw)
                .ok_or_else(|| ApiError::bad_request(format!("Unknown report status: {raw}")))?,
        ),
    };

    validate_page(query.page).map_err(|error| ApiError::validation(vec![error]))?;

    let filter = ReportFilter {
        status,
        page: clamp_page(query.page),
        limit: clamp_limit(query.limit),
    };

    let page = state.report_service().list(filter).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// # Endpoint
/// `PUT /api/admin/reports/{id}/status`
pub async fn update_report_status(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Report>>, ApiError> {
    let Path(id) = path?;
    let Json(request) = payload?;

    let status = ReportStatus::parse(&request.status).ok_or_else(|| {
        ApiError::bad_request(format!("Unknown report status: {}", request.status))
    })?;

    let report = state
        .report_service()
        .update_status(id, status, request.admin_notes)
        .await?;
    Ok(Json(ApiResponse::success(report)))
}
