//! Domain service for the emergency-supply inventory. Every operation is
//! authorized through household membership.

use serde::Serialize;
use thiserror::Error;

use crate::domain::{HouseholdId, ItemId, UserId};

#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Item not found: {0}")]
    NotFound(ItemId),

    #[error("Household not found: {0}")]
    HouseholdNotFound(HouseholdId),

    #[error("Not a member of household {0}")]
    NotAMember(HouseholdId),

    #[error("Unknown unit: {0}")]
    UnknownUnit(i32),

    #[error("Unknown category: {0}")]
    UnknownCategory(i32),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ItemError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ItemError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitDto {
    pub id: i32,
    pub name_no: String,
    pub name_en: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryDto {
    pub id: i32,
    pub name_no: String,
    pub name_en: String,
    pub kcal_per_unit: Option<f64>,
    pub is_essential: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemDto {
    pub id: ItemId,
    pub name: String,
    pub amount: f64,
    pub unit: Option<UnitDto>,
    pub category: Option<CategoryDto>,
    pub expiration_date: Option<String>,
    pub household_ids: Vec<HouseholdId>,
}

/// Write model for create and update. Update replaces the scalar fields and
/// the full household-association list.
#[derive(Debug, Clone)]
pub struct ItemWrite {
    pub name: String,
    pub amount: f64,
    pub unit_id: i32,
    pub category_id: i32,
    pub expiration_date: Option<String>,
    pub household_ids: Vec<HouseholdId>,
}

/// Domain service trait for inventory items.
#[async_trait::async_trait]
pub trait ItemService: Send + Sync {
    async fn list_for_household(
        &self,
        user: UserId,
        household_id: HouseholdId,
    ) -> Result<Vec<ItemDto>, ItemError>;

    /// Requires membership in at least one household holding the item.
    async fn get(&self, user: UserId, id: ItemId) -> Result<ItemDto, ItemError>;

    /// Requires membership in every household the item is attached to.
    async fn create(&self, user: UserId, input: ItemWrite) -> Result<ItemDto, ItemError>;

    /// Requires membership in every current and every new owning household.
    async fn update(
        &self,
        user: UserId,
        id: ItemId,
        input: ItemWrite,
    ) -> Result<ItemDto, ItemError>;

    /// Clears the household associations before removing the row. Requires
    /// membership in every owning household.
    async fn delete(&self, user: UserId, id: ItemId) -> Result<(), ItemError>;
}
