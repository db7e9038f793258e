use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::entities::content::{self, ContentType};

pub const DEFAULT_PAGE_SIZE: u64 = 24;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Highest page a listing accepts. Keeps `(page - 1) * limit` well inside `i64`.
pub const MAX_PAGE: u64 = 1_000_000;

/// `None` and 0 mean the first page. Values past [`MAX_PAGE`] are capped.
#[must_use]
pub fn clamp_page(page: Option<u64>) -> u64 {
    page.unwrap_or(1).clamp(1, MAX_PAGE)
}

#[must_use]
pub fn clamp_limit(limit: Option<u64>) -> u64 {
    match limit {
        None | Some(0) => DEFAULT_PAGE_SIZE,
        Some(limit) => limit.min(MAX_PAGE_SIZE),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: i32,
    pub title: String,
    pub title_arabic: String,
    pub description: Option<String>,
    pub description_arabic: Option<String>,
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub category_id: Option<i32>,
    pub genre_id: Option<i32>,
    pub year: i32,
    pub language: String,
    pub quality: String,
    pub resolution: String,
    pub rating: f64,
    pub duration: Option<i32>,
    pub episodes: Option<i32>,
    pub poster_url: Option<String>,
    pub view_count: i32,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<content::Model> for Content {
    fn from(model: content::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            title_arabic: model.title_arabic,
            description: model.description,
            description_arabic: model.description_arabic,
            kind: model.kind,
            category_id: model.category_id,
            genre_id: model.genre_id,
            year: model.year,
            language: model.language,
            quality: model.quality,
            resolution: model.resolution,
            rating: model.rating,
            duration: model.duration,
            episodes: model.episodes,
            poster_url: model.poster_url,
            view_count: model.view_count,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    Title,
    Year,
    Rating,
    ViewCount,
}

impl SortField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Title => "title",
            Self::Year => "year",
            Self::Rating => "rating",
            Self::ViewCount => "view_count",
        }
    }

    /// Accepts snake and camel case plus a few short forms.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "created_at" | "createdat" | "date" | "newest" => Some(Self::CreatedAt),
            "title" | "name" => Some(Self::Title),
            "year" => Some(Self::Year),
            "rating" => Some(Self::Rating),
            "view_count" | "viewcount" | "views" => Some(Self::ViewCount),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Listing order. Newest first unless the caller asks otherwise; ties always
/// break on descending id so pages stay stable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl ContentSort {
    #[must_use]
    pub const fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }
}

/// Narrowing criteria for catalog listings.
///
/// Equality fields match exactly, `min_rating` is an inclusive lower bound and
/// `search` is a substring match on either title. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentFilter {
    pub kind: Option<ContentType>,
    pub category: Option<i32>,
    pub genre: Option<i32>,
    pub year: Option<i32>,
    pub language: Option<String>,
    pub quality: Option<String>,
    pub min_rating: Option<f64>,
    pub search: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub sort: ContentSort,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ContentFilter {
    #[must_use]
    pub fn page(&self) -> u64 {
        clamp_page(self.page)
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        clamp_limit(self.limit)
    }

    /// Rows skipped before this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    /// Deterministic cache key. Every field takes part so two filters share a
    /// key only when they select the same page of the same set.
    #[must_use]
    pub fn cache_key(&self) -> String {
        let mut key = String::from("content:list");

        let _ = write!(
            key,
            ":type={}:category={}:genre={}:year={}:language={}:quality={}:rating={}:q={}:from={}:to={}",
            self.kind.map(ContentType::as_str).unwrap_or_default(),
            display_opt(self.category),
            display_opt(self.genre),
            display_opt(self.year),
            self.language.as_deref().unwrap_or_default(),
            self.quality.as_deref().unwrap_or_default(),
            display_opt(self.min_rating),
            self.search.as_deref().unwrap_or_default(),
            display_opt(self.year_from),
            display_opt(self.year_to),
        );
        let _ = write!(
            key,
            ":sort={}:{}:page={}:limit={}",
            self.sort.field.as_str(),
            self.sort.order.as_str(),
            self.page(),
            self.limit()
        );

        key
    }
}

fn display_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPage {
    pub content: Vec<Content>,
    /// Size of the whole filtered set, not of this page.
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStats {
    pub content: Vec<TypeCount>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_content: u64,
    pub total_users: u64,
    pub total_categories: u64,
    pub total_genres: u64,
    pub total_reports: u64,
    pub pending_reports: u64,
    pub total_views: i64,
    pub recent_content: Vec<Content>,
    pub top_rated_content: Vec<Content>,
    pub most_viewed_content: Vec<Content>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCount {
    pub id: i32,
    pub view_count: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContent {
    pub title: String,
    pub title_arabic: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_arabic: Option<String>,
    #[serde(rename = "type")]
    pub kind: ContentType,
    #[serde(default)]
    pub category_id: Option<i32>,
    #[serde(default)]
    pub genre_id: Option<i32>,
    pub year: i32,
    pub language: String,
    pub quality: String,
    pub resolution: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub duration: Option<i32>,
    #[serde(default)]
    pub episodes: Option<i32>,
    #[serde(default)]
    pub poster_url: Option<String>,
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentPatch {
    pub title: Option<String>,
    pub title_arabic: Option<String>,
    pub description: Option<String>,
    pub description_arabic: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ContentType>,
    pub category_id: Option<i32>,
    pub genre_id: Option<i32>,
    pub year: Option<i32>,
    pub language: Option<String>,
    pub quality: Option<String>,
    pub resolution: Option<String>,
    pub rating: Option<f64>,
    pub duration: Option<i32>,
    pub episodes: Option<i32>,
    pub poster_url: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_aliases() {
        assert_eq!(ContentType::parse("movies"), Some(ContentType::Movie));
        assert_eq!(ContentType::parse("television"), Some(ContentType::Tv));
        assert_eq!(ContentType::parse("miscellaneous"), Some(ContentType::Misc));
        assert_eq!(ContentType::parse("Games"), Some(ContentType::Game));
        assert_eq!(ContentType::parse("series"), Some(ContentType::Series));
        assert_eq!(ContentType::parse("anime"), None);
    }

    #[test]
    fn test_pagination_defaults_and_clamping() {
        let filter = ContentFilter::default();
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.limit(), DEFAULT_PAGE_SIZE);

        let filter = ContentFilter {
            page: Some(0),
            limit: Some(10_000),
            ..Default::default()
        };
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_huge_page_is_capped() {
        let filter = ContentFilter {
            page: Some(u64::MAX),
            ..Default::default()
        };
        assert_eq!(filter.page(), MAX_PAGE);
        assert_eq!(filter.offset(), (MAX_PAGE - 1) * DEFAULT_PAGE_SIZE);
        assert!(i64::try_from(filter.offset()).is_ok());

        let filter = ContentFilter {
            page: Some(u64::MAX),
            limit: Some(u64::MAX),
            ..Default::default()
        };
        assert!(i64::try_from(filter.offset()).is_ok());
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!(SortField::parse("viewCount"), Some(SortField::ViewCount));
        assert_eq!(SortField::parse("created_at"), Some(SortField::CreatedAt));
        assert_eq!(SortField::parse("Title"), Some(SortField::Title));
        assert_eq!(SortField::parse("popularity"), None);
        assert_eq!(SortOrder::parse("ASC"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse("sideways"), None);
        assert_eq!(
            ContentSort::default(),
            ContentSort::new(SortField::CreatedAt, SortOrder::Desc)
        );
    }

    #[test]
    fn test_cache_key_distinguishes_filters() {
        let movies = ContentFilter {
            kind: Some(ContentType::Movie),
            ..Default::default()
        };
        let rated_movies = ContentFilter {
            kind: Some(ContentType::Movie),
            min_rating: Some(7.0),
            ..Default::default()
        };
        let second_page = ContentFilter {
            kind: Some(ContentType::Movie),
            page: Some(2),
            ..Default::default()
        };

        assert_ne!(movies.cache_key(), rated_movies.cache_key());
        assert_ne!(movies.cache_key(), second_page.cache_key());

        let by_title = ContentFilter {
            kind: Some(ContentType::Movie),
            sort: ContentSort::new(SortField::Title, SortOrder::Asc),
            ..Default::default()
        };
        assert_ne!(movies.cache_key(), by_title.cache_key());
        assert_eq!(movies.cache_key(), movies.clone().cache_key());
        assert!(movies.cache_key().starts_with("content:"));
    }

    #[test]
    fn test_content_serializes_type_field() {
        let stats = TypeCount {
            kind: ContentType::Tv,
            count: 3,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["type"], "tv");
        assert_eq!(json["count"], 3);
    }
}
