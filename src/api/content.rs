use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
};
use serde::{Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use super::validation::{parse_content_type, validate_content_id, validate_page};
use super::{ApiError, ApiResponse, AppState, FieldError};
use crate::entities::content::ContentType;
use crate::models::content::{
    Content, ContentFilter, ContentPage, ContentSort, ContentStats, SortField, SortOrder,
    ViewCount,
};

/// Query string accepted by the listing and search routes. Empty values and
/// `all` mean "no filter".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentQuery {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub category: Option<i32>,
    #[serde(default, deserialize_with = "lenient")]
    pub genre: Option<i32>,
    #[serde(default, deserialize_with = "lenient")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "lenient")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub quality: Option<String>,
    /// Inclusive minimum.
    #[serde(
        default,
        alias = "ratingMin",
        alias = "minRating",
        deserialize_with = "lenient"
    )]
    pub rating: Option<f64>,
    #[serde(default, alias = "search", alias = "query", deserialize_with = "lenient")]
    pub q: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub year_from: Option<i32>,
    #[serde(default, deserialize_with = "lenient")]
    pub year_to: Option<i32>,
    #[serde(default, deserialize_with = "lenient")]
    pub sort_by: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub sort_order: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub limit: Option<u64>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("" | "all") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl ContentQuery {
    /// `path_kind` comes from `/content/{type}` and wins over `?type=`.
    pub fn into_filter(self, path_kind: Option<ContentType>) -> Result<ContentFilter, ApiError> {
        let kind = match (path_kind, self.kind.as_deref()) {
            (Some(kind), _) => Some(kind),
            (None, Some(raw)) => Some(parse_content_type(raw)?),
            (None, None) => None,
        };

        let mut errors = Vec::new();

        if self.rating.is_some_and(|rating| !rating.is_finite()) {
            errors.push(FieldError::new("rating", "Rating must be a finite number"));
        }

        let field = match self.sort_by.as_deref() {
            None => Some(SortField::default()),
            Some(raw) => {
                let parsed = SortField::parse(raw);
                if parsed.is_none() {
                    errors.push(FieldError::new("sortBy", format!("Unknown sort field: {raw}")));
                }
                parsed
            }
        };
        let order = match self.sort_order.as_deref() {
            None => Some(SortOrder::default()),
            Some(raw) => {
                let parsed = SortOrder::parse(raw);
                if parsed.is_none() {
                    errors.push(FieldError::new(
                        "sortOrder",
                        format!("Sort order must be asc or desc, got {raw}"),
                    ));
                }
                parsed
            }
        };

        if let Err(error) = validate_page(self.page) {
            errors.push(error);
        }

        let (Some(field), Some(order)) = (field, order) else {
            return Err(ApiError::validation(errors));
        };
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        Ok(ContentFilter {
            kind,
            category: self.category,
            genre: self.genre,
            year: self.year,
            language: self.language,
            quality: self.quality,
            min_rating: self.rating,
            search: self.q,
            year_from: self.year_from,
            year_to: self.year_to,
            sort: ContentSort::new(field, order),
            page: self.page,
            limit: self.limit,
        })
    }
}

/// Lists active catalog entries.
///
/// # Endpoint
/// `GET /api/content`
pub async fn list_content(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ContentQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<ContentPage>>, ApiError> {
    let Query(query) = query?;
    let page = state
        .catalog_service()
        .list_content(query.into_filter(None)?)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

/// Type-scoped listing. Accepts plural and long-form aliases.
///
/// # Endpoint
/// `GET /api/content/{type}`
pub async fn list_content_by_type(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<ContentQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<ContentPage>>, ApiError> {
    let Path(raw_kind) = path?;
    let Query(query) = query?;
    let kind = parse_content_type(&raw_kind)?;

    let page = state
        .catalog_service()
        .list_content(query.into_filter(Some(kind))?)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

/// Free-text search over both titles combined with the listing filters.
///
/// # Endpoint
/// `GET /api/search`
pub async fn search_content(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ContentQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<ContentPage>>, ApiError> {
    let Query(mut query) = query?;
    query.q = query
        .q
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty());

    let page = state
        .catalog_service()
        .list_content(query.into_filter(None)?)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

/// # Endpoint
/// `GET /api/content/stats`
pub async fn content_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ContentStats>>, ApiError> {
    let stats = state.catalog_service().content_stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// Highest rated active items.
///
/// # Endpoint
/// `GET /api/content/featured`
pub async fn featured_content(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Content>>>, ApiError> {
    let content = state.catalog_service().featured_content().await?;
    Ok(Json(ApiResponse::success(content)))
}

/// Most viewed active items.
///
/// # Endpoint
/// `GET /api/content/trending`
pub async fn trending_content(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Content>>>, ApiError> {
    let content = state.catalog_service().trending_content().await?;
    Ok(Json(ApiResponse::success(content)))
}

/// Newest first, whatever `sortBy` says. The listing filters still apply.
///
/// # Endpoint
/// `GET /api/content/recent`
pub async fn recent_content(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ContentQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<ContentPage>>, ApiError> {
    let Query(mut query) = query?;
    query.sort_by = None;
    query.sort_order = None;

    let page = state
        .catalog_service()
        .list_content(query.into_filter(None)?)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

/// # Endpoint
/// `POST /api/content/{id}/view`
pub async fn record_view(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<ApiResponse<ViewCount>>, ApiError> {
    let Path(id) = path?;
    let id = validate_content_id(id)?;

    let views = state.catalog_service().record_view(id).await?;
    Ok(Json(ApiResponse::success(views)))
}

/// # Endpoint
/// `GET /api/content/item/{id}`
pub async fn get_content_item(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<ApiResponse<Content>>, ApiError> {
    let Path(id) = path?;
    let id = validate_content_id(id)?;

    let content = state.catalog_service().get_content(id).await?;
    Ok(Json(ApiResponse::success(content)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::content::MAX_PAGE;

    fn parse(query: &str) -> ContentQuery {
        let uri: axum::http::Uri = format!("/api/content?{query}").parse().unwrap();
        Query::<ContentQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_query_maps_to_filter() {
        let filter = parse("type=movies&rating=7&category=2&page=3")
            .into_filter(None)
            .unwrap();
        assert_eq!(filter.kind, Some(ContentType::Movie));
        assert_eq!(filter.min_rating, Some(7.0));
        assert_eq!(filter.category, Some(2));
        assert_eq!(filter.page(), 3);
    }

    #[test]
    fn test_empty_and_all_values_do_not_filter() {
        let filter = parse("type=all&category=&language=all&yearFrom=2000")
            .into_filter(None)
            .unwrap();
        assert_eq!(filter.kind, None);
        assert_eq!(filter.category, None);
        assert_eq!(filter.language, None);
        assert_eq!(filter.year_from, Some(2000));
    }

    #[test]
    fn test_path_kind_wins() {
        let filter = parse("type=game")
            .into_filter(Some(ContentType::Series))
            .unwrap();
        assert_eq!(filter.kind, Some(ContentType::Series));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(parse("type=podcast").into_filter(None).is_err());
    }

    #[test]
    fn test_rating_min_alias() {
        let filter = parse("q=dune&ratingMin=8.5").into_filter(None).unwrap();
        assert_eq!(filter.min_rating, Some(8.5));
        assert_eq!(filter.search.as_deref(), Some("dune"));

        let filter = parse("query=dune").into_filter(None).unwrap();
        assert_eq!(filter.search.as_deref(), Some("dune"));
    }

    #[test]
    fn test_non_finite_rating_is_rejected() {
        for raw in ["NaN", "inf", "-inf", "infinity"] {
            let result = parse(&format!("rating={raw}")).into_filter(None);
            assert!(
                matches!(result, Err(ApiError::Validation(ref errors)) if errors[0].field == "rating"),
                "rating={raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_page_beyond_limit_is_rejected() {
        let result = parse("page=18446744073709551615").into_filter(None);
        assert!(matches!(result, Err(ApiError::Validation(ref errors)) if errors[0].field == "page"));

        let filter = parse("page=1000000").into_filter(None).unwrap();
        assert_eq!(filter.page(), MAX_PAGE);
    }

    #[test]
    fn test_sort_parameters() {
        let filter = parse("sortBy=rating&sortOrder=asc").into_filter(None).unwrap();
        assert_eq!(filter.sort, ContentSort::new(SortField::Rating, SortOrder::Asc));

        let filter = parse("sortBy=title").into_filter(None).unwrap();
        assert_eq!(filter.sort, ContentSort::new(SortField::Title, SortOrder::Desc));

        let filter = parse("").into_filter(None).unwrap();
        assert_eq!(filter.sort, ContentSort::default());

        let Err(ApiError::Validation(errors)) =
            parse("sortBy=popularity&sortOrder=up").into_filter(None)
        else {
            panic!("unknown sort values should be rejected");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["sortBy", "sortOrder"]);
    }
}
