//! Domain service for households: creation, the two-phase join-code
//! protocol (generate, redeem) and membership management.

use serde::Serialize;
use thiserror::Error;

use crate::domain::{HouseholdId, UserId};

#[derive(Debug, Error)]
pub enum HouseholdError {
    #[error("Household not found: {0}")]
    NotFound(HouseholdId),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Not a member of this household")]
    NotAMember,

    #[error("Requires household admin privileges")]
    NotHouseholdAdmin,

    #[error("Could not generate a unique join code")]
    CodeExhausted,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for HouseholdError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for HouseholdError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HouseholdDto {
    pub id: HouseholdId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub member_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberDto {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
    pub is_primary: bool,
    pub joined_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinCodeDto {
    pub code: String,
    pub expires_at: String,
}

/// Domain service trait for household membership.
#[async_trait::async_trait]
pub trait HouseholdService: Send + Sync {
    /// Creates a household; the creator becomes its admin member.
    async fn create(
        &self,
        creator: UserId,
        name: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<HouseholdDto, HouseholdError>;

    /// Member-gated lookup.
    async fn get(&self, user: UserId, id: HouseholdId) -> Result<HouseholdDto, HouseholdError>;

    async fn list_for_user(&self, user: UserId) -> Result<Vec<HouseholdDto>, HouseholdError>;

    /// Deletes the household. Caller must be an admin member.
    async fn delete(&self, user: UserId, id: HouseholdId) -> Result<(), HouseholdError>;

    async fn members(
        &self,
        user: UserId,
        id: HouseholdId,
    ) -> Result<Vec<MemberDto>, HouseholdError>;

    /// Mints a short-lived invitation code. Caller must be an admin member.
    ///
    /// # Errors
    ///
    /// Returns [`HouseholdError::CodeExhausted`] when no unique code is
    /// found within the attempt budget; this is fatal and not retried.
    async fn generate_join_code(
        &self,
        user: UserId,
        id: HouseholdId,
    ) -> Result<JoinCodeDto, HouseholdError>;

    /// Redeems a join code. An unknown or expired code yields `Ok(None)` —
    /// callers must treat that as "invalid code", not as an error.
    async fn join(
        &self,
        user: UserId,
        code: &str,
    ) -> Result<Option<HouseholdDto>, HouseholdError>;

    /// Removes a member. Removing an absent membership is a silent no-op.
    /// Members can remove themselves; removing others requires household
    /// admin privileges.
    async fn remove_member(
        &self,
        acting: UserId,
        id: HouseholdId,
        member: UserId,
    ) -> Result<(), HouseholdError>;

    /// Marks the household as the user's primary one.
    async fn set_primary(&self, user: UserId, id: HouseholdId) -> Result<(), HouseholdError>;
}
