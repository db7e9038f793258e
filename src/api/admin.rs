//! Back-office routes. Everything here sits behind `admin_middleware`.

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::auth::AdminUser;
use super::validation::{validate_content_id, validate_content_patch, validate_new_content};
use super::{ApiError, ApiResponse, AppState, ClearedCount};
use crate::cache::CacheStats;
use crate::constants::messages;
use crate::models::content::{Content, ContentPatch, DashboardStats, NewContent};

#[derive(Debug, Default, Deserialize)]
pub struct ClearCacheRequest {
    #[serde(default)]
    pub pattern: Option<String>,
}

/// # Endpoint
/// `GET /api/admin/stats`
pub async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    let stats = state.catalog_service().dashboard_stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// # Endpoint
/// `POST /api/admin/content`
pub async fn create_content(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewContent>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Content>>), ApiError> {
    let Json(input) = payload?;
    let input = validate_new_content(input)?;

    let created = state.catalog_service().create_content(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// Partial update; absent fields keep their stored values.
///
/// # Endpoint
/// `PUT /api/admin/content/{id}`
pub async fn update_content(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<ContentPatch>, JsonRejection>,
) -> Result<Json<ApiResponse<Content>>, ApiError> {
    let Path(id) = path?;
    let id = validate_content_id(id)?;
    let Json(patch) = payload?;
    let patch = validate_content_patch(patch)?;

    let updated = state.catalog_service().update_content(id, patch).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Soft delete.
///
/// # Endpoint
/// `DELETE /api/admin/content/{id}`
pub async fn deactivate_content(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let Path(id) = path?;
    let id = validate_content_id(id)?;

    state.catalog_service().deactivate_content(id).await?;
    Ok(Json(ApiResponse::message("Content deactivated")))
}

/// Drops cached query results, all of them or those whose key contains
/// `pattern`. An empty body clears everything.
///
/// # Endpoint
/// `POST /api/admin/clear-cache`
pub async fn clear_cache(
    State(state): State<Arc<AppState>>,
    Extension(admin): AdminUser,
    body: Bytes,
) -> Result<Json<ApiResponse<ClearedCount>>, ApiError> {
    let request: ClearCacheRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ClearCacheRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|_| ApiError::bad_request(messages::VALIDATION_FAILED))?
    };
    let pattern = request
        .pattern
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    let cleared = state.shared.cache.clear(pattern.as_deref()).await;

    info!(
        event = "cache_cleared",
        admin = %admin.username,
        pattern = pattern.as_deref().unwrap_or("*"),
        cleared,
        "Query cache cleared"
    );

    Ok(Json(ApiResponse::with_message(
        ClearedCount { cleared },
        messages::CACHE_CLEARED,
    )))
}

/// # Endpoint
/// `GET /api/admin/cache`
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<CacheStats>> {
    Json(ApiResponse::success(state.shared.cache.stats().await))
}
