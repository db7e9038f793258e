//! Domain service for admin authentication.
//!
//! Sessions hold a [`SessionUser`] snapshot. Every admin request re-reads the
//! user row, so deactivating an account or revoking admin rights takes effect
//! on the next request.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::User;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Forbidden")]
    Forbidden,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// What the session cookie maps to on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: i32,
    pub username: String,
    pub is_admin: bool,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// Outcome of the startup admin check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    AlreadyPresent,
    Created { username: String },
    /// The password was generated and must be shown to the operator once.
    CreatedWithGeneratedPassword { username: String, password: String },
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown user, a wrong
    /// password or an inactive account.
    async fn login(&self, username: &str, password: &str) -> Result<SessionUser, AuthError>;

    /// Re-validates a session against the users table.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Forbidden`] if the account is inactive or no longer an admin.
    async fn authorize_admin(&self, session: &SessionUser) -> Result<SessionUser, AuthError>;

    async fn user_info(&self, user_id: i32) -> Result<UserInfo, AuthError>;

    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the current password is wrong or the new one is too short.
    async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Creates the configured admin account when no admin exists yet.
    async fn ensure_bootstrap_admin(&self) -> Result<BootstrapOutcome, AuthError>;
}
