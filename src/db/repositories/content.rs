use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::content::{self, ContentType};
use crate::entities::prelude::*;
use crate::models::content::{
    ContentFilter, ContentPatch, ContentSort, NewContent, SortField, SortOrder,
};

const LIKE_ESCAPE: char = '\\';

/// `%query%` with the LIKE wildcards in `query` escaped, so user input only
/// ever matches literally.
fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

const fn sort_column(field: SortField) -> content::Column {
    match field {
        SortField::CreatedAt => content::Column::CreatedAt,
        SortField::Title => content::Column::Title,
        SortField::Year => content::Column::Year,
        SortField::Rating => content::Column::Rating,
        SortField::ViewCount => content::Column::ViewCount,
    }
}

const fn sort_order(order: SortOrder) -> Order {
    match order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    }
}

pub struct ContentRepository {
    conn: DatabaseConnection,
}

impl ContentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Active rows matching every set field of `filter`.
    fn condition(filter: &ContentFilter) -> Condition {
        let mut condition = Condition::all()
            .add(content::Column::IsActive.eq(true))
            .add_option(filter.kind.map(|kind| content::Column::Kind.eq(kind)))
            .add_option(filter.category.map(|id| content::Column::CategoryId.eq(id)))
            .add_option(filter.genre.map(|id| content::Column::GenreId.eq(id)))
            .add_option(filter.year.map(|year| content::Column::Year.eq(year)))
            .add_option(
                filter
                    .language
                    .as_deref()
                    .map(|language| content::Column::Language.eq(language)),
            )
            .add_option(
                filter
                    .quality
                    .as_deref()
                    .map(|quality| content::Column::Quality.eq(quality)),
            )
            .add_option(
                filter
                    .min_rating
                    .map(|rating| content::Column::Rating.gte(rating)),
            )
            .add_option(filter.year_from.map(|year| content::Column::Year.gte(year)))
            .add_option(filter.year_to.map(|year| content::Column::Year.lte(year)));

        if let Some(query) = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
        {
            let pattern = contains_pattern(query);
            condition = condition.add(
                Condition::any()
                    .add(
                        Expr::col(content::Column::Title)
                            .like(LikeExpr::new(pattern.clone()).escape(LIKE_ESCAPE)),
                    )
                    .add(
                        Expr::col(content::Column::TitleArabic)
                            .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
                    ),
            );
        }

        condition
    }

    /// Returns the requested page and the size of the whole filtered set.
    pub async fn list(&self, filter: &ContentFilter) -> Result<(Vec<content::Model>, u64)> {
        let ContentSort { field, order } = filter.sort;
        let paginator = Content::find()
            .filter(Self::condition(filter))
            .order_by(sort_column(field), sort_order(order))
            .order_by_desc(content::Column::Id)
            .paginate(&self.conn, filter.limit());

        let total = paginator
            .num_items()
            .await
            .context("Failed to count filtered content")?;
        let rows = paginator
            .fetch_page(filter.page() - 1)
            .await
            .context("Failed to fetch content page")?;

        Ok((rows, total))
    }

    pub async fn get(&self, id: i32) -> Result<Option<content::Model>> {
        Content::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query content by ID")
    }

    pub async fn get_active(&self, id: i32) -> Result<Option<content::Model>> {
        Ok(self.get(id).await?.filter(|row| row.is_active))
    }

    pub async fn create(&self, input: &NewContent) -> Result<content::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = content::ActiveModel {
            title: Set(input.title.clone()),
            title_arabic: Set(input.title_arabic.clone()),
            description: Set(input.description.clone()),
            description_arabic: Set(input.description_arabic.clone()),
            kind: Set(input.kind),
            category_id: Set(input.category_id),
            genre_id: Set(input.genre_id),
            year: Set(input.year),
            language: Set(input.language.clone()),
            quality: Set(input.quality.clone()),
            resolution: Set(input.resolution.clone()),
            rating: Set(input.rating),
            duration: Set(input.duration),
            episodes: Set(input.episodes),
            poster_url: Set(input.poster_url.clone()),
            view_count: Set(0),
            is_active: Set(true),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert content")
    }

    pub async fn update(&self, id: i32, patch: ContentPatch) -> Result<Option<content::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: content::ActiveModel = existing.into();

        if let Some(title) = patch.title {
            active.title = Set(title);
        }
        if let Some(title_arabic) = patch.title_arabic {
            active.title_arabic = Set(title_arabic);
        }
        if let Some(description) = patch.description {
            active.description = Set(Some(description));
        }
        if let Some(description_arabic) = patch.description_arabic {
            active.description_arabic = Set(Some(description_arabic));
        }
        if let Some(kind) = patch.kind {
            active.kind = Set(kind);
        }
        if let Some(category_id) = patch.category_id {
            active.category_id = Set(Some(category_id));
        }
        if let Some(genre_id) = patch.genre_id {
            active.genre_id = Set(Some(genre_id));
        }
        if let Some(year) = patch.year {
            active.year = Set(year);
        }
        if let Some(language) = patch.language {
            active.language = Set(language);
        }
        if let Some(quality) = patch.quality {
            active.quality = Set(quality);
        }
        if let Some(resolution) = patch.resolution {
            active.resolution = Set(resolution);
        }
        if let Some(rating) = patch.rating {
            active.rating = Set(rating);
        }
        if let Some(duration) = patch.duration {
            active.duration = Set(Some(duration));
        }
        if let Some(episodes) = patch.episodes {
            active.episodes = Set(Some(episodes));
        }
        if let Some(poster_url) = patch.poster_url {
            active.poster_url = Set(Some(poster_url));
        }
        if let Some(is_active) = patch.is_active {
            active.is_active = Set(is_active);
        }

        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update content")?;

        Ok(Some(updated))
    }

    /// Soft delete. Returns `false` when the row does not exist.
    pub async fn deactivate(&self, id: i32) -> Result<bool> {
        let patch = ContentPatch {
            is_active: Some(false),
            ..Default::default()
        };
        Ok(self.update(id, patch).await?.is_some())
    }

    pub async fn count_active(&self) -> Result<u64> {
        Content::find()
            .filter(content::Column::IsActive.eq(true))
            .count(&self.conn)
            .await
            .context("Failed to count content")
    }

    async fn count_active_of(&self, kind: ContentType) -> Result<u64> {
        Content::find()
            .filter(content::Column::IsActive.eq(true))
            .filter(content::Column::Kind.eq(kind))
            .count(&self.conn)
            .await
            .with_context(|| format!("Failed to count {kind} content"))
    }

    /// Active counts for every content type, including the empty ones.
    pub async fn count_by_type(&self) -> Result<Vec<(ContentType, u64)>> {
        let (movies, series, tv, misc, games) = tokio::try_join!(
            self.count_active_of(ContentType::Movie),
            self.count_active_of(ContentType::Series),
            self.count_active_of(ContentType::Tv),
            self.count_active_of(ContentType::Misc),
            self.count_active_of(ContentType::Game),
        )?;

        Ok(vec![
            (ContentType::Movie, movies),
            (ContentType::Series, series),
            (ContentType::Tv, tv),
            (ContentType::Misc, misc),
            (ContentType::Game, games),
        ])
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<content::Model>> {
        Content::find()
            .filter(content::Column::IsActive.eq(true))
            .order_by_desc(content::Column::CreatedAt)
            .order_by_desc(content::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to query recent content")
    }

    pub async fn top_rated(&self, limit: u64) -> Result<Vec<content::Model>> {
        Content::find()
            .filter(content::Column::IsActive.eq(true))
            .order_by_desc(content::Column::Rating)
            .order_by_desc(content::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to query top rated content")
    }

    pub async fn most_viewed(&self, limit: u64) -> Result<Vec<content::Model>> {
        Content::find()
            .filter(content::Column::IsActive.eq(true))
            .order_by_desc(content::Column::ViewCount)
            .order_by_desc(content::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to query most viewed content")
    }

    /// Bumps the counter in a single UPDATE. Returns the new count, or `None`
    /// when the item is absent or inactive.
    pub async fn increment_views(&self, id: i32) -> Result<Option<i32>> {
        let result = Content::update_many()
            .col_expr(
                content::Column::ViewCount,
                Expr::col(content::Column::ViewCount).add(1),
            )
            .filter(content::Column::Id.eq(id))
            .filter(content::Column::IsActive.eq(true))
            .exec(&self.conn)
            .await
            .context("Failed to increment view count")?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        Ok(self.get(id).await?.map(|row| row.view_count))
    }

    /// Sum of view counts over every row, active or not.
    pub async fn total_views(&self) -> Result<i64> {
        let total: Option<Option<i64>> = Content::find()
            .select_only()
            .column_as(Expr::col(content::Column::ViewCount).sum(), "total")
            .into_tuple()
            .one(&self.conn)
            .await
            .context("Failed to sum view counts")?;

        Ok(total.flatten().unwrap_or(0))
    }
}
