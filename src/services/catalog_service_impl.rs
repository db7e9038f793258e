//! `SeaORM` implementation of the `CatalogService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::cache::QueryCache;
use crate::constants::{cache_keys, limits};
use crate::db::Store;
use crate::models::content::{
    Content, ContentFilter, ContentPage, ContentPatch, ContentStats, DashboardStats, NewContent,
    TypeCount, ViewCount,
};
use crate::models::taxonomy::{
    DEFAULT_CATEGORIES, DEFAULT_GENRES, NewTerm, TaxonomyKind, TaxonomyTerm,
};
use crate::entities::reports::ReportStatus;
use crate::services::catalog_service::{CatalogError, CatalogService, SeedSummary};

pub struct SeaOrmCatalogService {
    store: Store,
    cache: Arc<QueryCache>,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Store, cache: Arc<QueryCache>) -> Self {
        Self { store, cache }
    }

    async fn ensure_references(
        &self,
        category_id: Option<i32>,
        genre_id: Option<i32>,
    ) -> Result<(), CatalogError> {
        if let Some(id) = category_id
            && !self.store.category_exists(id).await?
        {
            return Err(CatalogError::MissingReference {
                kind: TaxonomyKind::Category,
                id,
            });
        }

        if let Some(id) = genre_id
            && !self.store.genre_exists(id).await?
        {
            return Err(CatalogError::MissingReference {
                kind: TaxonomyKind::Genre,
                id,
            });
        }

        Ok(())
    }

    async fn invalidate_content(&self) {
        let lists = self.cache.clear(Some(cache_keys::CONTENT)).await;
        let stats = self.cache.clear(Some(cache_keys::STATS)).await;
        tracing::debug!(removed = lists + stats, "Invalidated content cache entries");
    }

    async fn invalidate_taxonomy(&self) {
        self.cache.clear(Some(cache_keys::TAXONOMY)).await;
        self.cache.clear(Some(cache_keys::STATS)).await;
    }
}

fn total_pages(total: u64, limit: u64) -> u64 {
    if limit == 0 { 0 } else { total.div_ceil(limit) }
}

#[async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn list_content(&self, filter: ContentFilter) -> Result<ContentPage, CatalogError> {
        let key = filter.cache_key();
        let ttl = self.cache.default_ttl();

        self.cache
            .optimize_query(&key, ttl, || async {
                let (rows, total) = self.store.list_content(&filter).await?;
                let limit = filter.limit();

                Ok::<_, CatalogError>(ContentPage {
                    content: rows.into_iter().map(Content::from).collect(),
                    total,
                    page: filter.page(),
                    limit,
                    total_pages: total_pages(total, limit),
                })
            })
            .await
    }

    async fn get_content(&self, id: i32) -> Result<Content, CatalogError> {
        let key = cache_keys::content_item(id);

        self.cache
            .optimize_query(&key, self.cache.default_ttl(), || async {
                self.store
                    .get_active_content(id)
                    .await?
                    .map(Content::from)
                    .ok_or(CatalogError::NotFound(id))
            })
            .await
    }

    async fn content_stats(&self) -> Result<ContentStats, CatalogError> {
        self.cache
            .optimize_query(
                cache_keys::CONTENT_STATS,
                self.cache.default_ttl(),
                || async {
                    let counts = self.store.count_content_by_type().await?;
                    let total = counts.iter().map(|(_, count)| count).sum();

                    Ok::<_, CatalogError>(ContentStats {
                        content: counts
                            .into_iter()
                            .map(|(kind, count)| TypeCount { kind, count })
                            .collect(),
                        total,
                    })
                },
            )
            .await
    }

    async fn featured_content(&self) -> Result<Vec<Content>, CatalogError> {
        self.cache
            .optimize_query(cache_keys::FEATURED, self.cache.default_ttl(), || async {
                let rows = self
                    .store
                    .top_rated_content(limits::HIGHLIGHT_LIST_SIZE)
                    .await?;
                Ok::<_, CatalogError>(rows.into_iter().map(Content::from).collect())
            })
            .await
    }

    async fn trending_content(&self) -> Result<Vec<Content>, CatalogError> {
        self.cache
            .optimize_query(cache_keys::TRENDING, self.cache.default_ttl(), || async {
                let rows = self
                    .store
                    .most_viewed_content(limits::HIGHLIGHT_LIST_SIZE)
                    .await?;
                Ok::<_, CatalogError>(rows.into_iter().map(Content::from).collect())
            })
            .await
    }

    async fn record_view(&self, id: i32) -> Result<ViewCount, CatalogError> {
        let view_count = self
            .store
            .increment_content_views(id)
            .await?
            .ok_or(CatalogError::NotFound(id))?;

        // Listings sorted by views catch up when their TTL runs out.
        self.cache.remove(&cache_keys::content_item(id)).await;
        self.cache.remove(cache_keys::TRENDING).await;
        self.cache.remove(cache_keys::DASHBOARD_STATS).await;

        tracing::debug!(content_id = id, view_count, "View recorded");
        Ok(ViewCount { id, view_count })
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, CatalogError> {
        self.cache
            .optimize_query(
                cache_keys::DASHBOARD_STATS,
                self.cache.default_ttl(),
                || async {
                    let store = &self.store;
                    let (
                        total_content,
                        total_users,
                        total_categories,
                        total_genres,
                        total_reports,
                        pending_reports,
                        total_views,
                        recent,
                        top_rated,
                        most_viewed,
                    ) = tokio::try_join!(
                        store.count_active_content(),
                        store.count_users(),
                        store.count_categories(),
                        store.count_genres(),
                        store.count_reports(),
                        store.count_reports_with_status(ReportStatus::Pending),
                        store.total_content_views(),
                        store.recent_content(limits::DASHBOARD_LIST_SIZE),
                        store.top_rated_content(limits::DASHBOARD_LIST_SIZE),
                        store.most_viewed_content(limits::DASHBOARD_LIST_SIZE),
                    )?;

                    Ok::<_, CatalogError>(DashboardStats {
                        total_content,
                        total_users,
                        total_categories,
                        total_genres,
                        total_reports,
                        pending_reports,
                        total_views,
                        recent_content: recent.into_iter().map(Content::from).collect(),
                        top_rated_content: top_rated.into_iter().map(Content::from).collect(),
                        most_viewed_content: most_viewed.into_iter().map(Content::from).collect(),
                    })
                },
            )
            .await
    }

    async fn create_content(&self, input: NewContent) -> Result<Content, CatalogError> {
        self.ensure_references(input.category_id, input.genre_id)
            .await?;

        let created = self.store.create_content(&input).await?;
        self.invalidate_content().await;

        info!(content_id = created.id, title = %created.title, "Content created");
        Ok(Content::from(created))
    }

    async fn update_content(&self, id: i32, patch: ContentPatch) -> Result<Content, CatalogError> {
        self.ensure_references(patch.category_id, patch.genre_id)
            .await?;

        let updated = self
            .store
            .update_content(id, patch)
            .await?
            .ok_or(CatalogError::NotFound(id))?;
        self.invalidate_content().await;

        info!(content_id = id, "Content updated");
        Ok(Content::from(updated))
    }

    async fn deactivate_content(&self, id: i32) -> Result<(), CatalogError> {
        if !self.store.deactivate_content(id).await? {
            return Err(CatalogError::NotFound(id));
        }
        self.invalidate_content().await;

        info!(content_id = id, "Content deactivated");
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<TaxonomyTerm>, CatalogError> {
        self.cache
            .optimize_query(cache_keys::CATEGORIES, self.cache.default_ttl(), || async {
                let rows = self.store.list_categories().await?;
                Ok::<_, CatalogError>(rows.into_iter().map(TaxonomyTerm::from).collect())
            })
            .await
    }

    async fn list_genres(&self) -> Result<Vec<TaxonomyTerm>, CatalogError> {
        self.cache
            .optimize_query(cache_keys::GENRES, self.cache.default_ttl(), || async {
                let rows = self.store.list_genres().await?;
                Ok::<_, CatalogError>(rows.into_iter().map(TaxonomyTerm::from).collect())
            })
            .await
    }

    async fn create_term(
        &self,
        kind: TaxonomyKind,
        term: NewTerm,
    ) -> Result<TaxonomyTerm, CatalogError> {
        let created = match kind {
            TaxonomyKind::Category => self
                .store
                .create_category(&term)
                .await?
                .map(TaxonomyTerm::from),
            TaxonomyKind::Genre => self.store.create_genre(&term).await?.map(TaxonomyTerm::from),
        };

        let created = created.ok_or_else(|| CatalogError::Duplicate {
            kind,
            name: term.name.clone(),
        })?;
        self.invalidate_taxonomy().await;

        info!(kind = kind.label(), name = %created.name, "Taxonomy term created");
        Ok(created)
    }

    async fn seed_taxonomy(&self) -> Result<SeedSummary, CatalogError> {
        let categories: Vec<NewTerm> = DEFAULT_CATEGORIES
            .iter()
            .map(|(name, arabic)| NewTerm::seed(name, arabic))
            .collect();
        let genres: Vec<NewTerm> = DEFAULT_GENRES
            .iter()
            .map(|(name, arabic)| NewTerm::seed(name, arabic))
            .collect();

        let summary = SeedSummary {
            categories_added: self.store.seed_categories(&categories).await?,
            genres_added: self.store.seed_genres(&genres).await?,
        };

        if summary.categories_added + summary.genres_added > 0 {
            self.invalidate_taxonomy().await;
        }

        info!(
            categories_added = summary.categories_added,
            genres_added = summary.genres_added,
            "Taxonomy seeded"
        );
        Ok(summary)
    }
}
