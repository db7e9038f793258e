use axum::{
    Extension, Json,
    extract::{ConnectInfo, Request, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState};
use crate::services::{AuthError, SessionUser, UserInfo};

/// Session key holding the serialized [`SessionUser`].
pub const SESSION_USER_KEY: &str = "user";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ============================================================================
// Session helpers
// ============================================================================

async fn session_user(session: &Session) -> Result<Option<SessionUser>, ApiError> {
    session
        .get::<SessionUser>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session read failed: {e}")))
}

async fn require_session_user(session: &Session) -> Result<SessionUser, ApiError> {
    session_user(session).await?.ok_or_else(ApiError::unauthorized)
}

// ============================================================================
// Middleware
// ============================================================================

/// Guards admin routes. The session must exist, and its user must still be
/// an active admin in the database.
pub async fn admin_middleware(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = require_session_user(&session).await?;

    let user = match state.auth_service().authorize_admin(&user).await {
        Ok(user) => user,
        Err(AuthError::UserNotFound) => {
            session.flush().await.ok();
            return Err(ApiError::unauthorized());
        }
        Err(e) => return Err(e.into()),
    };

    tracing::Span::current().record("user_id", user.id);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Locks out clients that keep failing `POST /api/auth/login`.
///
/// A 401 from the handler counts as a failure. Any success clears the count.
pub async fn login_throttle_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client = client_key(
        peer,
        request.headers(),
        &state.config().security.auth_throttle.trusted_proxy_ips,
    );

    let throttle = state.login_throttle();
    if let Some(retry_after) = throttle.retry_after(&client) {
        tracing::warn!(client = %client, "Login rejected while locked out");
        return ApiError::too_many_requests(retry_after).into_response();
    }

    let response = next.run(request).await;

    if response.status() == StatusCode::UNAUTHORIZED {
        if let Some(lockout) = throttle.record_failure(&client) {
            tracing::warn!(
                client = %client,
                lockout_secs = lockout.as_secs(),
                "Too many failed logins, client locked out"
            );
            metrics::counter!("auth_lockouts_total").increment(1);
        }
    } else if response.status().is_success() {
        throttle.record_success(&client);
    }

    response
}

/// Throttle identity for a request: the first `X-Forwarded-For` hop when the
/// peer is a trusted proxy, otherwise the peer address.
fn client_key(peer: Option<IpAddr>, headers: &HeaderMap, trusted_proxies: &[String]) -> String {
    let Some(peer) = peer else {
        return "unknown".to_string();
    };

    let trusted = trusted_proxies
        .iter()
        .filter_map(|ip| ip.parse::<IpAddr>().ok())
        .any(|ip| ip == peer);

    if trusted {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .and_then(|value| value.parse::<IpAddr>().ok());
        if let Some(client) = forwarded {
            return client.to_string();
        }
    }

    peer.to_string()
}

// ============================================================================
// Handlers
// ============================================================================

/// Verifies credentials and stores the user in a fresh session.
///
/// # Endpoint
/// `POST /api/auth/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let Json(payload) = payload?;

    let user = state
        .auth_service()
        .login(&payload.username, &payload.password)
        .await?;

    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to rotate session: {e}")))?;
    session
        .insert(SESSION_USER_KEY, &user)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    let info = state.auth_service().user_info(user.id).await?;
    Ok(Json(ApiResponse::success(info)))
}

/// # Endpoint
/// `POST /api/auth/logout`
pub async fn logout(session: Session) -> Result<Json<ApiResponse<()>>, ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to end session: {e}")))?;
    Ok(Json(ApiResponse::message("Logged out")))
}

/// The logged-in user, without credentials.
///
/// # Endpoint
/// `GET /api/auth/user`
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user = require_session_user(&session).await?;

    match state.auth_service().user_info(user.id).await {
        Ok(info) => Ok(Json(ApiResponse::success(info))),
        Err(AuthError::UserNotFound) => {
            session.flush().await.ok();
            Err(ApiError::unauthorized())
        }
        Err(e) => Err(e.into()),
    }
}

/// # Endpoint
/// `PUT /api/auth/password`
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    session: Session,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user = require_session_user(&session).await?;
    let Json(payload) = payload?;

    if payload.new_password == payload.current_password {
        return Err(ApiError::bad_request(
            "New password must differ from the current one",
        ));
    }

    state
        .auth_service()
        .change_password(
            &user.username,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    Ok(Json(ApiResponse::message("Password changed")))
}

/// Admin identity placed in request extensions by [`admin_middleware`].
pub type AdminUser = Extension<SessionUser>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn forwarded(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_client_key_uses_peer_by_default() {
        let peer: IpAddr = "203.0.113.7".parse().unwrap();

        assert_eq!(
            client_key(Some(peer), &forwarded("198.51.100.1"), &[]),
            "203.0.113.7"
        );
        assert_eq!(client_key(None, &HeaderMap::new(), &[]), "unknown");
    }

    #[test]
    fn test_client_key_trusts_configured_proxy() {
        let proxy: IpAddr = "10.0.0.2".parse().unwrap();
        let trusted = vec!["10.0.0.2".to_string()];

        assert_eq!(
            client_key(Some(proxy), &forwarded("198.51.100.1, 10.0.0.2"), &trusted),
            "198.51.100.1"
        );
        assert_eq!(
            client_key(Some(proxy), &forwarded("not-an-ip"), &trusted),
            "10.0.0.2"
        );
    }
}
