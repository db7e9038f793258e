use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::validate_term;
use super::{ApiError, ApiResponse, AppState};
use crate::models::taxonomy::{NewTerm, TaxonomyKind, TaxonomyTerm};

/// # Endpoint
/// `GET /api/categories`
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<TaxonomyTerm>>>, ApiError> {
    let categories = state.catalog_service().list_categories().await?;
    Ok(Json(ApiResponse::success(categories)))
}

/// # Endpoint
/// `GET /api/genres`
pub async fn list_genres(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<TaxonomyTerm>>>, ApiError> {
    let genres = state.catalog_service().list_genres().await?;
    Ok(Json(ApiResponse::success(genres)))
}

/// # Endpoint
/// `POST /api/admin/categories`
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewTerm>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<TaxonomyTerm>>), ApiError> {
    create_term(&state, TaxonomyKind::Category, payload).await
}

/// # Endpoint
/// `POST /api/admin/genres`
pub async fn create_genre(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewTerm>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<TaxonomyTerm>>), ApiError> {
    create_term(&state, TaxonomyKind::Genre, payload).await
}

async fn create_term(
    state: &AppState,
    kind: TaxonomyKind,
    payload: Result<Json<NewTerm>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<TaxonomyTerm>>), ApiError> {
    let Json(term) = payload?;
    let term = validate_term(term)?;

    let created = state.catalog_service().create_term(kind, term).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}
