//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::constants::limits;
use crate::db::{Store, repositories::user::generate_password};
use crate::services::auth_service::{
    AuthError, AuthService, BootstrapOutcome, SessionUser, UserInfo,
};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<SessionUser, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let Some(user) = self.store.verify_user_password(username, password).await? else {
            warn!(event = "login_failed", username = %username, "Invalid login attempt");
            return Err(AuthError::InvalidCredentials);
        };

        info!(event = "login", user_id = user.id, username = %user.username, "User logged in");
        Ok(SessionUser::from(&user))
    }

    async fn authorize_admin(&self, session: &SessionUser) -> Result<SessionUser, AuthError> {
        let user = self
            .store
            .get_user_by_id(session.id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active || !user.is_admin {
            return Err(AuthError::Forbidden);
        }

        Ok(SessionUser::from(&user))
    }

    async fn user_info(&self, user_id: i32) -> Result<UserInfo, AuthError> {
        self.store
            .get_user_by_id(user_id)
            .await?
            .filter(|user| user.is_active)
            .map(UserInfo::from)
            .ok_or(AuthError::UserNotFound)
    }

    async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if new_password.chars().count() < limits::MIN_PASSWORD_CHARS {
            return Err(AuthError::Validation(format!(
                "New password must be at least {} characters",
                limits::MIN_PASSWORD_CHARS
            )));
        }

        if self
            .store
            .verify_user_password(username, current_password)
            .await?
            .is_none()
        {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .update_user_password(username, new_password, &self.security)
            .await?;

        info!(event = "password_changed", username = %username, "Password changed");
        Ok(())
    }

    async fn ensure_bootstrap_admin(&self) -> Result<BootstrapOutcome, AuthError> {
        if self.store.admin_exists().await? {
            return Ok(BootstrapOutcome::AlreadyPresent);
        }

        let username = self.security.admin_username.trim().to_string();
        let (password, generated) = match self.security.admin_password.as_deref() {
            Some(password) if !password.is_empty() => (password.to_string(), false),
            _ => (generate_password(limits::BOOTSTRAP_PASSWORD_LENGTH), true),
        };

        self.store
            .create_user(
                &username,
                &self.security.admin_email,
                &password,
                true,
                &self.security,
            )
            .await?;

        info!(event = "admin_bootstrapped", username = %username, "Created admin account");

        Ok(if generated {
            BootstrapOutcome::CreatedWithGeneratedPassword { username, password }
        } else {
            BootstrapOutcome::Created { username }
        })
    }
}
