use axum::{
    Json, Router,
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tracing::{info, warn};

use crate::config::Config;
use crate::constants::messages;
use crate::db::Store;
use crate::services::{
    AuthService, BootstrapOutcome, CatalogService, LoginThrottle, ReportService,
};
use crate::state::SharedState;

mod admin;
mod assets;
pub mod auth;
mod content;
mod error;
mod observability;
mod reports;
mod taxonomy;
mod types;
pub mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.shared.store
    }

    #[must_use]
    pub fn catalog_service(&self) -> &Arc<dyn CatalogService> {
        &self.shared.catalog_service
    }

    #[must_use]
    pub fn report_service(&self) -> &Arc<dyn ReportService> {
        &self.shared.report_service
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn login_throttle(&self) -> &LoginThrottle {
        &self.shared.login_throttle
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

/// Connects the store, wires the services and makes sure an admin account
/// exists.
pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);

    match shared
        .auth_service
        .ensure_bootstrap_admin()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bootstrap admin account: {e}"))?
    {
        BootstrapOutcome::AlreadyPresent => {}
        BootstrapOutcome::Created { username } => {
            info!(username = %username, "Admin account created from configuration");
        }
        BootstrapOutcome::CreatedWithGeneratedPassword { username, password } => {
            warn!(
                username = %username,
                password = %password,
                "Admin account created with a generated password. Change it after first login"
            );
        }
    }

    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, static_dir, secure_cookies, inactivity_minutes) = {
        let config = state.config();
        error::set_verbose_errors(config.general.environment.is_development());
        (
            config.server.cors_allowed_origins.clone(),
            config.server.static_dir.clone(),
            config.server.secure_cookies,
            config.server.session_inactivity_minutes,
        )
    };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            inactivity_minutes,
        )));

    let admin_routes = create_admin_router(state.clone());

    let api_router = Router::new()
        .route("/health", get(observability::health))
        .route("/content", get(content::list_content))
        .route("/content/stats", get(content::content_stats))
        .route("/content/featured", get(content::featured_content))
        .route("/content/trending", get(content::trending_content))
        .route("/content/recent", get(content::recent_content))
        .route("/content/item/{id}", get(content::get_content_item))
        // One segment name for both: a content type when listing, an id for views.
        .route("/content/{key}", get(content::list_content_by_type))
        .route("/content/{key}/view", post(content::record_view))
        .route("/search", get(content::search_content))
        .route("/categories", get(taxonomy::list_categories))
        .route("/genres", get(taxonomy::list_genres))
        .route("/reports/reasons", get(reports::list_reasons))
        .route(
            "/reports",
            post(reports::submit_report).merge(get(reports::list_reports).route_layer(
                middleware::from_fn_with_state(state.clone(), auth::admin_middleware),
            )),
        )
        .route(
            "/auth/login",
            post(auth::login).route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::login_throttle_middleware,
            )),
        )
        .route("/auth/logout", post(auth::logout))
        .route("/auth/user", get(auth::current_user))
        .route("/auth/password", put(auth::change_password))
        .nest("/admin", admin_routes)
        .fallback(api_not_found)
        .layer(session_layer)
        .layer(panic_boundary())
        .with_state(state.clone());

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(AnyOrigin)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .fallback_service(assets::spa_service(&static_dir))
        .layer(cors_layer.allow_methods(AnyOrigin).allow_headers(AnyOrigin))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn_with_state(
            state,
            observability::logging_middleware,
        ))
}

fn create_admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats", get(admin::dashboard_stats))
        .route("/content", post(admin::create_content))
        .route(
            "/content/{id}",
            put(admin::update_content).delete(admin::deactivate_content),
        )
        .route("/categories", post(taxonomy::create_category))
        .route("/genres", post(taxonomy::create_genre))
        .route("/reports", get(reports::list_reports))
        .route(
            "/reports/{id}/status",
            put(reports::update_report_status),
        )
        .route("/clear-cache", post(admin::clear_cache))
        .route("/cache", get(admin::cache_stats))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::admin_middleware))
}

async fn api_not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

/// Turns a handler panic into the generic 500 envelope. The connection and
/// every other route keep serving.
#[must_use]
pub fn panic_boundary() -> CatchPanicLayer<fn(Box<dyn Any + Send + 'static>) -> Response> {
    CatchPanicLayer::custom(panic_response as fn(Box<dyn Any + Send + 'static>) -> Response)
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");

    tracing::error!(event = "handler_panic", panic = %detail, "Handler panicked");
    metrics::counter!("http_handler_panics_total").increment(1);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error(messages::SERVER_ERROR)),
    )
        .into_response()
}
