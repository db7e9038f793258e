use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::{DatabaseConfig, SecurityConfig};
use crate::entities::content::{self, ContentType};
use crate::entities::reports::{self, ReportStatus};
use crate::entities::{categories, genres};
use crate::models::content::{ContentFilter, ContentPatch, NewContent};
use crate::models::report::{NewReport, ReportFilter};
use crate::models::taxonomy::NewTerm;

pub mod migrator;
pub mod repositories;

pub use repositories::user::User;

/// Tables the schema check expects to find.
pub const EXPECTED_TABLES: &[&str] = &["categories", "genres", "content", "users", "reports"];

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::connect(
            &config.url,
            config.max_connections,
            config.min_connections,
            config.sqlx_logging,
            true,
        )
        .await
    }

    /// Connects without applying migrations, for inspecting a database as it is.
    pub async fn open_unmigrated(config: &DatabaseConfig) -> Result<Self> {
        Self::connect(&config.url, 1, 1, config.sqlx_logging, false).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        Self::connect(db_url, max_connections, min_connections, false, true).await
    }

    async fn connect(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
        sqlx_logging: bool,
        migrate: bool,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if let Some(path_str) = sqlite_file_path(db_url) {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(sqlx_logging);

        let conn = Database::connect(opt)
            .await
            .context("Failed to connect to database")?;

        if migrate {
            migrator::Migrator::up(&conn, None)
                .await
                .context("Failed to apply migrations")?;
            info!(
                "Database connected & migrations applied (pool: {}-{})",
                min_connections, max_connections
            );
        } else {
            info!("Database connected without migrations");
        }

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn content_repo(&self) -> repositories::content::ContentRepository {
        repositories::content::ContentRepository::new(self.conn.clone())
    }

    fn taxonomy_repo(&self) -> repositories::taxonomy::TaxonomyRepository {
        repositories::taxonomy::TaxonomyRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn report_repo(&self) -> repositories::report::ReportRepository {
        repositories::report::ReportRepository::new(self.conn.clone())
    }

    // Content

    pub async fn list_content(&self, filter: &ContentFilter) -> Result<(Vec<content::Model>, u64)> {
        self.content_repo().list(filter).await
    }

    pub async fn get_content(&self, id: i32) -> Result<Option<content::Model>> {
        self.content_repo().get(id).await
    }

    pub async fn get_active_content(&self, id: i32) -> Result<Option<content::Model>> {
        self.content_repo().get_active(id).await
    }

    pub async fn create_content(&self, input: &NewContent) -> Result<content::Model> {
        self.content_repo().create(input).await
    }

    pub async fn update_content(
        &self,
        id: i32,
        patch: ContentPatch,
    ) -> Result<Option<content::Model>> {
        self.content_repo().update(id, patch).await
    }

    pub async fn deactivate_content(&self, id: i32) -> Result<bool> {
        self.content_repo().deactivate(id).await
    }

    pub async fn count_active_content(&self) -> Result<u64> {
        self.content_repo().count_active().await
    }

    pub async fn count_content_by_type(&self) -> Result<Vec<(ContentType, u64)>> {
        self.content_repo().count_by_type().await
    }

    pub async fn recent_content(&self, limit: u64) -> Result<Vec<content::Model>> {
        self.content_repo().recent(limit).await
    }

    pub async fn top_rated_content(&self, limit: u64) -> Result<Vec<content::Model>> {
        self.content_repo().top_rated(limit).await
    }

    pub async fn most_viewed_content(&self, limit: u64) -> Result<Vec<content::Model>> {
        self.content_repo().most_viewed(limit).await
    }

    pub async fn increment_content_views(&self, id: i32) -> Result<Option<i32>> {
        self.content_repo().increment_views(id).await
    }

    pub async fn total_content_views(&self) -> Result<i64> {
        self.content_repo().total_views().await
    }

    // Categories & genres

    pub async fn list_categories(&self) -> Result<Vec<categories::Model>> {
        self.taxonomy_repo().list_categories().await
    }

    pub async fn list_genres(&self) -> Result<Vec<genres::Model>> {
        self.taxonomy_repo().list_genres().await
    }

    pub async fn category_exists(&self, id: i32) -> Result<bool> {
        self.taxonomy_repo().category_exists(id).await
    }

    pub async fn genre_exists(&self, id: i32) -> Result<bool> {
        self.taxonomy_repo().genre_exists(id).await
    }

    pub async fn create_category(&self, term: &NewTerm) -> Result<Option<categories::Model>> {
        self.taxonomy_repo().create_category(term).await
    }

    pub async fn create_genre(&self, term: &NewTerm) -> Result<Option<genres::Model>> {
        self.taxonomy_repo().create_genre(term).await
    }

    pub async fn seed_categories(&self, terms: &[NewTerm]) -> Result<u64> {
        self.taxonomy_repo().seed_categories(terms).await
    }

    pub async fn seed_genres(&self, terms: &[NewTerm]) -> Result<u64> {
        self.taxonomy_repo().seed_genres(terms).await
    }

    pub async fn count_categories(&self) -> Result<u64> {
        self.taxonomy_repo().count_categories().await
    }

    pub async fn count_genres(&self) -> Result<u64> {
        self.taxonomy_repo().count_genres().await
    }

    // Users

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn update_user_password(
        &self,
        username: &str,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(username, new_password, config)
            .await
    }

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        is_admin: bool,
        config: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo()
            .create(username, email, password, is_admin, config)
            .await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    pub async fn admin_exists(&self) -> Result<bool> {
        self.user_repo().admin_exists().await
    }

    // Reports

    pub async fn insert_report(&self, report: &NewReport) -> Result<reports::Model> {
        self.report_repo().insert(report).await
    }

    pub async fn list_reports(&self, filter: &ReportFilter) -> Result<(Vec<reports::Model>, u64)> {
        self.report_repo().list(filter).await
    }

    pub async fn update_report_status(
        &self,
        id: i32,
        status: ReportStatus,
        admin_notes: Option<String>,
    ) -> Result<Option<reports::Model>> {
        self.report_repo()
            .update_status(id, status, admin_notes)
            .await
    }

    pub async fn count_reports(&self) -> Result<u64> {
        self.report_repo().count().await
    }

    pub async fn count_reports_with_status(&self, status: ReportStatus) -> Result<u64> {
        self.report_repo().count_with_status(status).await
    }

    /// Row count per expected table, `None` where the table cannot be read.
    pub async fn table_counts(&self) -> Vec<(&'static str, Option<i64>)> {
        let backend = self.conn.get_database_backend();
        let mut counts = Vec::with_capacity(EXPECTED_TABLES.len());

        for table in EXPECTED_TABLES {
            let sql = format!("SELECT COUNT(*) AS count FROM {table}");
            let count = match self
                .conn
                .query_one(Statement::from_string(backend, sql))
                .await
            {
                Ok(Some(row)) => row.try_get::<i64>("", "count").ok(),
                Ok(None) | Err(_) => None,
            };
            counts.push((*table, count));
        }

        counts
    }
}

/// Filesystem path of a file-backed SQLite URL. In-memory and non-SQLite URLs
/// yield `None`.
fn sqlite_file_path(db_url: &str) -> Option<&str> {
    let rest = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();

    if path.is_empty() || path.contains(":memory:") || path.starts_with("file:") {
        None
    } else {
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(sqlite_file_path("sqlite:data/cinema.db"), Some("data/cinema.db"));
        assert_eq!(
            sqlite_file_path("sqlite://data/cinema.db?mode=rwc"),
            Some("data/cinema.db")
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/cinema"), None);
    }
}
