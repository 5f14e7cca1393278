//! Domain service for account management: registration, login and the
//! privileged-account lifecycle.

use serde::Serialize;
use thiserror::Error;

use crate::domain::{Role, UserId};

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Email address already in use")]
    EmailTaken,

    #[error("Phone number already in use")]
    PhoneTaken,

    #[error("Forbidden: {0}")]
    Forbidden(String),

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
        Self::Internal(err.to_string())
    }
}

/// User info DTO for responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub role: Role,
    pub email_verified: bool,
}

/// Login/registration result: the signed bearer token plus the account.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Domain service trait for accounts.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Registers a regular user and signs them in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailTaken`] / [`AuthError::PhoneTaken`] on
    /// conflicts and [`AuthError::Validation`] for malformed input.
    async fn register(&self, input: RegisterInput) -> Result<LoginResult, AuthError>;

    /// Verifies credentials and returns a signed token.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Like [`AuthService::login`] but rejects accounts without an admin role.
    async fn admin_login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError>;

    async fn get_user_info(&self, id: UserId) -> Result<UserInfo, AuthError>;

    /// Creates an admin account. Caller must be a superadmin.
    async fn create_admin(
        &self,
        acting_role: Role,
        input: RegisterInput,
    ) -> Result<UserInfo, AuthError>;

    /// Promotes an existing admin to superadmin. Caller must be a superadmin.
    async fn elevate_admin(&self, acting_role: Role, target: UserId)
    -> Result<UserInfo, AuthError>;

    /// Deletes a privileged account. Caller must be a superadmin and cannot
    /// delete themselves or the last remaining superadmin.
    async fn delete_admin(
        &self,
        acting_role: Role,
        acting_id: UserId,
        target: UserId,
    ) -> Result<(), AuthError>;

    async fn list_admins(&self) -> Result<Vec<UserInfo>, AuthError>;
}
