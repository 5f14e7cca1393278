//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, OnceLock};

use crate::config::SecurityConfig;
use crate::db::{NewUser, Store, User};
use crate::domain::{Role, UserId};
use crate::services::auth_service::{
    AuthError, AuthService, LoginResult, RegisterInput, UserInfo,
};
use crate::services::token::TokenIssuer;

fn email_regex() -> &'static Regex {
    static INSTANCE: OnceLock<Regex> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
    })
}

fn phone_regex() -> &'static Regex {
    static INSTANCE: OnceLock<Regex> = OnceLock::new();
    INSTANCE.get_or_init(|| Regex::new(r"^\+?[0-9]{8,15}$").expect("phone regex is valid"))
}

pub fn validate_register_input(input: &RegisterInput) -> Result<(), AuthError> {
    if !email_regex().is_match(&input.email) {
        return Err(AuthError::Validation("Invalid email address".to_string()));
    }

    if !phone_regex().is_match(&input.phone) {
        return Err(AuthError::Validation("Invalid phone number".to_string()));
    }

    if input.password.len() < 8 {
        return Err(AuthError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
        return Err(AuthError::Validation("Name cannot be empty".to_string()));
    }

    Ok(())
}

pub struct SeaOrmAuthService {
    store: Store,
    tokens: Arc<TokenIssuer>,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: Arc<TokenIssuer>, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
        }
    }

    fn to_login_result(&self, user: User) -> Result<LoginResult, AuthError> {
        let token = self
            .tokens
            .issue(&user)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(LoginResult {
            token,
            user: to_user_info(user),
        })
    }

    async fn create_account(
        &self,
        input: RegisterInput,
        role: Role,
    ) -> Result<User, AuthError> {
        validate_register_input(&input)?;

        if self.store.email_in_use(&input.email).await? {
            return Err(AuthError::EmailTaken);
        }

        if self.store.phone_in_use(&input.phone).await? {
            return Err(AuthError::PhoneTaken);
        }

        let user = self
            .store
            .create_user(
                NewUser {
                    email: input.email,
                    password: input.password,
                    first_name: input.first_name,
                    last_name: input.last_name,
                    phone: input.phone,
                    latitude: input.latitude,
                    longitude: input.longitude,
                    role,
                },
                &self.security,
            )
            .await?;

        Ok(user)
    }
}

fn to_user_info(user: User) -> UserInfo {
    UserInfo {
        id: user.id,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        phone: user.phone,
        latitude: user.latitude,
        longitude: user.longitude,
        role: user.role,
        email_verified: user.email_verified,
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, input: RegisterInput) -> Result<LoginResult, AuthError> {
        let user = self.create_account(input, Role::User).await?;
        tracing::info!("Registered user {}", user.id);
        self.to_login_result(user)
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

        self.to_login_result(user)
    }

    async fn admin_login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let result = self.login(email, password).await?;

        if !result.user.role.is_admin() {
            // Deliberately indistinguishable from a bad password.
            return Err(AuthError::InvalidCredentials);
        }

        Ok(result)
    }

    async fn get_user_info(&self, id: UserId) -> Result<UserInfo, AuthError> {
        let user = self.store.get_user(id).await?.ok_or(AuthError::UserNotFound)?;
        Ok(to_user_info(user))
    }

    async fn create_admin(
        &self,
        acting_role: Role,
        input: RegisterInput,
    ) -> Result<UserInfo, AuthError> {
        if !acting_role.is_superadmin() {
            return Err(AuthError::Forbidden(
                "Only superadmins can create admin accounts".to_string(),
            ));
        }

        let user = self.create_account(input, Role::Admin).await?;
        tracing::info!("Created admin account {}", user.id);
        Ok(to_user_info(user))
    }

    async fn elevate_admin(
        &self,
        acting_role: Role,
        target: UserId,
    ) -> Result<UserInfo, AuthError> {
        if !acting_role.is_superadmin() {
            return Err(AuthError::Forbidden(
                "Only superadmins can elevate admins".to_string(),
            ));
        }

        let user = self
            .store
            .get_user(target)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.role != Role::Admin {
            return Err(AuthError::Validation(
                "Only admin accounts can be elevated".to_string(),
            ));
        }

        self.store.set_user_role(target, Role::Superadmin).await?;
        tracing::info!("Elevated admin {} to superadmin", target);

        let user = self
            .store
            .get_user(target)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        Ok(to_user_info(user))
    }

    async fn delete_admin(
        &self,
        acting_role: Role,
        acting_id: UserId,
        target: UserId,
    ) -> Result<(), AuthError> {
        if !acting_role.is_superadmin() {
            return Err(AuthError::Forbidden(
                "Only superadmins can delete admin accounts".to_string(),
            ));
        }

        if acting_id == target {
            return Err(AuthError::Validation(
                "Cannot delete your own account".to_string(),
            ));
        }

        let user = self
            .store
            .get_user(target)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.role.is_admin() {
            return Err(AuthError::Validation(
                "Target account is not privileged".to_string(),
            ));
        }

        if user.role.is_superadmin() && self.store.count_superadmins().await? <= 1 {
            return Err(AuthError::Validation(
                "Cannot delete the last superadmin".to_string(),
            ));
        }

        self.store.remove_user(target).await?;
        tracing::info!("Deleted privileged account {}", target);
        Ok(())
    }

    async fn list_admins(&self) -> Result<Vec<UserInfo>, AuthError> {
        let users = self.store.list_privileged_users().await?;
        Ok(users.into_iter().map(to_user_info).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> RegisterInput {
        RegisterInput {
            email: "ola@example.no".to_string(),
            password: "hemmelig123".to_string(),
            first_name: "Ola".to_string(),
            last_name: "Nordmann".to_string(),
            phone: "+4798765432".to_string(),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(validate_register_input(&input()).is_ok());
    }

    #[test]
    fn test_bad_email_is_rejected() {
        let mut bad = input();
        bad.email = "not-an-email".to_string();
        assert!(validate_register_input(&bad).is_err());
    }

    #[test]
    fn test_bad_phone_is_rejected() {
        let mut bad = input();
        bad.phone = "12".to_string();
        assert!(validate_register_input(&bad).is_err());

        bad.phone = "phone number".to_string();
        assert!(validate_register_input(&bad).is_err());
    }

    #[test]
    fn test_short_password_is_rejected() {
        let mut bad = input();
        bad.password = "kort".to_string();
        assert!(validate_register_input(&bad).is_err());
    }
}
