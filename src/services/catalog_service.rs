//! Domain service for the content catalog.
//!
//! Covers listing and filtering, statistics, admin edits, and the category and
//! genre taxonomies. Read paths go through the query cache; writes invalidate
//! the keys they affect.

use serde::Serialize;
use thiserror::Error;

use crate::models::content::{
    Content, ContentFilter, ContentPage, ContentPatch, ContentStats, DashboardStats, NewContent,
    ViewCount,
};
use crate::models::taxonomy::{NewTerm, TaxonomyKind, TaxonomyTerm};

/// Errors specific to catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Content {0} not found")]
    NotFound(i32),

    #[error("{} {id} not found", .kind.label())]
    MissingReference { kind: TaxonomyKind, id: i32 },

    #[error("{} '{name}' already exists", .kind.label())]
    Duplicate { kind: TaxonomyKind, name: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub categories_added: u64,
    pub genres_added: u64,
}

#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// Active content matching `filter`, one page at a time.
    async fn list_content(&self, filter: ContentFilter) -> Result<ContentPage, CatalogError>;

    /// A single active item.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the item is absent or deactivated.
    async fn get_content(&self, id: i32) -> Result<Content, CatalogError>;

    /// Per-type counts of active content.
    async fn content_stats(&self) -> Result<ContentStats, CatalogError>;

    /// Highest rated active items.
    async fn featured_content(&self) -> Result<Vec<Content>, CatalogError>;

    /// Most viewed active items.
    async fn trending_content(&self) -> Result<Vec<Content>, CatalogError>;

    /// Counts one view of an active item and returns the new total.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the item is absent or deactivated.
    async fn record_view(&self, id: i32) -> Result<ViewCount, CatalogError>;

    async fn dashboard_stats(&self) -> Result<DashboardStats, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::MissingReference`] when the category or genre does not exist.
    async fn create_content(&self, input: NewContent) -> Result<Content, CatalogError>;

    async fn update_content(&self, id: i32, patch: ContentPatch) -> Result<Content, CatalogError>;

    /// Soft delete: the row stays but disappears from public listings.
    async fn deactivate_content(&self, id: i32) -> Result<(), CatalogError>;

    async fn list_categories(&self) -> Result<Vec<TaxonomyTerm>, CatalogError>;

    async fn list_genres(&self) -> Result<Vec<TaxonomyTerm>, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::Duplicate`] when the name is taken.
    async fn create_term(
        &self,
        kind: TaxonomyKind,
        term: NewTerm,
    ) -> Result<TaxonomyTerm, CatalogError>;

    /// Inserts the default categories and genres, skipping existing names.
    async fn seed_taxonomy(&self) -> Result<SeedSummary, CatalogError>;
}
