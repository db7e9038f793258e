use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryOrder, Set,
    SqlErr,
};

use crate::entities::{categories, genres, prelude::*};
use crate::models::taxonomy::NewTerm;

/// Names are UNIQUE. The index is the only duplicate check, so concurrent
/// creates of one name cannot both succeed.
fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

pub struct TaxonomyRepository {
    conn: DatabaseConnection,
}

impl TaxonomyRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_categories(&self) -> Result<Vec<categories::Model>> {
        Categories::find()
            .order_by_asc(categories::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list categories")
    }

    pub async fn list_genres(&self) -> Result<Vec<genres::Model>> {
        Genres::find()
            .order_by_asc(genres::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list genres")
    }

    pub async fn category_exists(&self, id: i32) -> Result<bool> {
        Ok(Categories::find_by_id(id).one(&self.conn).await?.is_some())
    }

    pub async fn genre_exists(&self, id: i32) -> Result<bool> {
        Ok(Genres::find_by_id(id).one(&self.conn).await?.is_some())
    }

    /// Returns `None` when a category with the same name already exists.
    pub async fn create_category(&self, term: &NewTerm) -> Result<Option<categories::Model>> {
        let now = chrono::Utc::now().to_rfc3339();
        let active = categories::ActiveModel {
            name: Set(term.name.clone()),
            name_arabic: Set(term.name_arabic.clone()),
            description: Set(term.description.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(Some(model)),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e).context("Failed to insert category"),
        }
    }

    /// Returns `None` when a genre with the same name already exists.
    pub async fn create_genre(&self, term: &NewTerm) -> Result<Option<genres::Model>> {
        let now = chrono::Utc::now().to_rfc3339();
        let active = genres::ActiveModel {
            name: Set(term.name.clone()),
            name_arabic: Set(term.name_arabic.clone()),
            description: Set(term.description.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(Some(model)),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e).context("Failed to insert genre"),
        }
    }

    /// Conflict-skip insert on `name`. Returns how many rows were new.
    pub async fn seed_categories(&self, terms: &[NewTerm]) -> Result<u64> {
        if terms.is_empty() {
            return Ok(0);
        }

        let now = chrono::Utc::now().to_rfc3339();
        let rows = terms.iter().map(|term| categories::ActiveModel {
            name: Set(term.name.clone()),
            name_arabic: Set(term.name_arabic.clone()),
            description: Set(term.description.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        });

        let before = Categories::find().count(&self.conn).await?;
        Categories::insert_many(rows)
            .on_conflict(
                OnConflict::column(categories::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to seed categories")?;
        let after = Categories::find().count(&self.conn).await?;

        Ok(after.saturating_sub(before))
    }

    /// Conflict-skip insert on `name`. Returns how many rows were new.
    pub async fn seed_genres(&self, terms: &[NewTerm]) -> Result<u64> {
        if terms.is_empty() {
            return Ok(0);
        }

        let now = chrono::Utc::now().to_rfc3339();
        let rows = terms.iter().map(|term| genres::ActiveModel {
            name: Set(term.name.clone()),
            name_arabic: Set(term.name_arabic.clone()),
            description: Set(term.description.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        });

        let before = Genres::find().count(&self.conn).await?;
        Genres::insert_many(rows)
            .on_conflict(
                OnConflict::column(genres::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to seed genres")?;
        let after = Genres::find().count(&self.conn).await?;

        Ok(after.saturating_sub(before))
    }

    pub async fn count_categories(&self) -> Result<u64> {
        Categories::find()
            .count(&self.conn)
            .await
            .context("Failed to count categories")
    }

    pub async fn count_genres(&self) -> Result<u64> {
        Genres::find()
            .count(&self.conn)
            .await
            .context("Failed to count genres")
    }
}
