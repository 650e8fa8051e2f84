//! `SeaORM` implementation of the `AuthService` trait.

use crate::config::SecurityConfig;
use crate::constants::limits::MIN_PASSWORD_LENGTH;
use crate::db::{Store, User};
use crate::services::auth_service::{AuthError, AuthService, LoginResult, UserInfo};
use async_trait::async_trait;

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    fn to_user_info(user: User) -> UserInfo {
        UserInfo {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            avatar_url: user.avatar_url,
            team_id: user.team_id,
            total_points: user.total_points,
            created_at: user.created_at,
        }
    }

    fn validate_email(email: &str) -> Result<&str, AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::Validation("Email is required".to_string()));
        }
        // Real validation happens when the confirmation mail bounces; this
        // only rejects obvious garbage.
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(AuthError::Validation(format!("Invalid email: {email}")));
        }
        Ok(email)
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        email: &str,
        full_name: &str,
        password: &str,
    ) -> Result<UserInfo, AuthError> {
        let email = Self::validate_email(email)?;

        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(AuthError::Validation("Full name is required".to_string()));
        }

        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        if self.store.get_user_by_email(email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let user = self
            .store
            .create_user(email, full_name, password, &self.security)
            .await?;

        Ok(Self::to_user_info(user))
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let is_valid = self.store.verify_user_password(email, password).await?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(LoginResult {
            email: user.email,
            full_name: user.full_name,
            api_key: user.api_key,
        })
    }

    async fn verify_api_key(&self, api_key: &str) -> Result<Option<String>, AuthError> {
        let user = self.store.verify_api_key(api_key).await?;
        Ok(user.map(|u| u.email))
    }

    async fn get_user_info(&self, email: &str) -> Result<UserInfo, AuthError> {
        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(Self::to_user_info(user))
    }

    async fn change_password(
        &self,
        email: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::Validation(format!(
                "New password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let is_valid = self
            .store
            .verify_user_password(email, current_password)
            .await?;

        if !is_valid {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .update_user_password(email, new_password, &self.security)
            .await?;

        Ok(())
    }

    async fn regenerate_api_key(&self, email: &str) -> Result<String, AuthError> {
        let new_api_key = self.store.regenerate_user_api_key(email).await?;

        Ok(new_api_key)
    }
}
