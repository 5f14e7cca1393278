use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use crate::domain::{HouseholdId, UserId};
use crate::entities::{
    household_join_codes, household_members, households, prelude::*, users,
};

pub struct HouseholdRepository {
    conn: DatabaseConnection,
}

impl HouseholdRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Creates the household and its first membership (admin, primary if the
    /// creator has no primary household yet) in one transaction.
    pub async fn create_with_admin(
        &self,
        name: &str,
        latitude: f64,
        longitude: f64,
        creator: UserId,
    ) -> Result<households::Model> {
        let txn = self.conn.begin().await?;
        let now = chrono::Utc::now().to_rfc3339();

        let household = households::ActiveModel {
            name: Set(name.to_string()),
            latitude: Set(latitude),
            longitude: Set(longitude),
            created_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let has_primary = HouseholdMembers::find()
            .filter(household_members::Column::UserId.eq(creator))
            .filter(household_members::Column::IsPrimary.eq(true))
            .count(&txn)
            .await?
            > 0;

        household_members::ActiveModel {
            user_id: Set(creator),
            household_id: Set(household.id),
            is_admin: Set(true),
            is_primary: Set(!has_primary),
            joined_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!("Created household {} ({})", household.id, household.name);
        Ok(household)
    }

    pub async fn get(&self, id: HouseholdId) -> Result<Option<households::Model>> {
        let household = Households::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query household")?;
        Ok(household)
    }

    pub async fn remove(&self, id: HouseholdId) -> Result<bool> {
        let result = Households::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<households::Model>> {
        let memberships = HouseholdMembers::find()
            .filter(household_members::Column::UserId.eq(user_id))
            .all(&self.conn)
            .await?;

        let ids: Vec<HouseholdId> = memberships.iter().map(|m| m.household_id).collect();
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = Households::find()
            .filter(households::Column::Id.is_in(ids))
            .order_by_asc(households::Column::Name)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn members(
        &self,
        household_id: HouseholdId,
    ) -> Result<Vec<(household_members::Model, users::Model)>> {
        let rows = HouseholdMembers::find()
            .filter(household_members::Column::HouseholdId.eq(household_id))
            .find_also_related(Users)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(membership, user)| user.map(|u| (membership, u)))
            .collect())
    }

    pub async fn member_count(&self, household_id: HouseholdId) -> Result<u64> {
        let count = HouseholdMembers::find()
            .filter(household_members::Column::HouseholdId.eq(household_id))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    pub async fn membership(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
    ) -> Result<Option<household_members::Model>> {
        let row = HouseholdMembers::find_by_id((user_id, household_id))
            .one(&self.conn)
            .await?;
        Ok(row)
    }

    pub async fn add_member(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
        is_admin: bool,
    ) -> Result<household_members::Model> {
        let txn = self.conn.begin().await?;

        let has_primary = HouseholdMembers::find()
            .filter(household_members::Column::UserId.eq(user_id))
            .filter(household_members::Column::IsPrimary.eq(true))
            .count(&txn)
            .await?
            > 0;

        let row = household_members::ActiveModel {
            user_id: Set(user_id),
            household_id: Set(household_id),
            is_admin: Set(is_admin),
            is_primary: Set(!has_primary),
            joined_at: Set(chrono::Utc::now().to_rfc3339()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(row)
    }

    /// Removing an absent membership is a no-op, reported via the bool.
    pub async fn remove_member(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
    ) -> Result<bool> {
        let result = HouseholdMembers::delete_by_id((user_id, household_id))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Clears the primary flag on the user's other memberships and sets it
    /// on the given household, in one transaction.
    pub async fn set_primary(&self, user_id: UserId, household_id: HouseholdId) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let target = HouseholdMembers::find_by_id((user_id, household_id))
            .one(&txn)
            .await?;
        let Some(target) = target else {
            txn.rollback().await?;
            return Ok(false);
        };

        HouseholdMembers::update_many()
            .col_expr(
                household_members::Column::IsPrimary,
                sea_orm::sea_query::Expr::value(false),
            )
            .filter(household_members::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        let mut active: household_members::ActiveModel = target.into();
        active.is_primary = Set(true);
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }

    // ========================================================================
    // Join codes
    // ========================================================================

    /// Uniqueness is checked against every stored code, expired included.
    pub async fn code_exists(&self, code: &str) -> Result<bool> {
        let count = HouseholdJoinCodes::find()
            .filter(household_join_codes::Column::Code.eq(code))
            .count(&self.conn)
            .await?;
        Ok(count > 0)
    }

    pub async fn insert_code(
        &self,
        household_id: HouseholdId,
        code: &str,
        expires_at: &str,
    ) -> Result<household_join_codes::Model> {
        let row = household_join_codes::ActiveModel {
            code: Set(code.to_string()),
            household_id: Set(household_id),
            expires_at: Set(expires_at.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        Ok(row)
    }

    pub async fn find_code(&self, code: &str) -> Result<Option<household_join_codes::Model>> {
        let row = HouseholdJoinCodes::find()
            .filter(household_join_codes::Column::Code.eq(code))
            .one(&self.conn)
            .await?;
        Ok(row)
    }
}
