//! `SeaORM` implementation of the `HouseholdService` trait.

use async_trait::async_trait;
use rand::Rng;

use crate::constants::join_code;
use crate::db::Store;
use crate::domain::{HouseholdId, UserId};
use crate::entities::households;
use crate::services::household_service::{
    HouseholdDto, HouseholdError, HouseholdService, JoinCodeDto, MemberDto,
};

/// Draws one candidate code from the 36-symbol alphabet using the thread
/// CSPRNG.
#[must_use]
pub fn random_code() -> String {
    let mut rng = rand::rng();
    (0..join_code::LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..join_code::ALPHABET.len());
            join_code::ALPHABET[idx] as char
        })
        .collect()
}

fn parse_expiry(raw: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.to_utc())
}

pub struct SeaOrmHouseholdService {
    store: Store,
}

impl SeaOrmHouseholdService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn to_dto(&self, household: households::Model) -> Result<HouseholdDto, HouseholdError> {
        let member_count = self.store.household_member_count(household.id).await?;
        Ok(HouseholdDto {
            id: household.id,
            name: household.name,
            latitude: household.latitude,
            longitude: household.longitude,
            member_count,
        })
    }

    async fn require_membership(
        &self,
        user: UserId,
        id: HouseholdId,
    ) -> Result<crate::entities::household_members::Model, HouseholdError> {
        if self.store.get_household(id).await?.is_none() {
            return Err(HouseholdError::NotFound(id));
        }

        self.store
            .membership(user, id)
            .await?
            .ok_or(HouseholdError::NotAMember)
    }

    async fn require_admin_membership(
        &self,
        user: UserId,
        id: HouseholdId,
    ) -> Result<(), HouseholdError> {
        let membership = self.require_membership(user, id).await?;
        if !membership.is_admin {
            return Err(HouseholdError::NotHouseholdAdmin);
        }
        Ok(())
    }
}

#[async_trait]
impl HouseholdService for SeaOrmHouseholdService {
    async fn create(
        &self,
        creator: UserId,
        name: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<HouseholdDto, HouseholdError> {
        if name.trim().is_empty() {
            return Err(HouseholdError::Validation(
                "Household name cannot be empty".to_string(),
            ));
        }

        if self.store.get_user(creator).await?.is_none() {
            return Err(HouseholdError::UserNotFound(creator));
        }

        let household = self
            .store
            .create_household(name.trim(), latitude, longitude, creator)
            .await?;

        self.to_dto(household).await
    }

    async fn get(&self, user: UserId, id: HouseholdId) -> Result<HouseholdDto, HouseholdError> {
        self.require_membership(user, id).await?;

        let household = self
            .store
            .get_household(id)
            .await?
            .ok_or(HouseholdError::NotFound(id))?;

        self.to_dto(household).await
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<HouseholdDto>, HouseholdError> {
        let households = self.store.households_for_user(user).await?;

        let mut dtos = Vec::with_capacity(households.len());
        for household in households {
            dtos.push(self.to_dto(household).await?);
        }
        Ok(dtos)
    }

    async fn delete(&self, user: UserId, id: HouseholdId) -> Result<(), HouseholdError> {
        self.require_admin_membership(user, id).await?;
        self.store.remove_household(id).await?;
        tracing::info!("Deleted household {}", id);
        Ok(())
    }

    async fn members(
        &self,
        user: UserId,
        id: HouseholdId,
    ) -> Result<Vec<MemberDto>, HouseholdError> {
        self.require_membership(user, id).await?;

        let rows = self.store.household_members(id).await?;
        Ok(rows
            .into_iter()
            .map(|(membership, user)| MemberDto {
                user_id: user.id,
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                is_admin: membership.is_admin,
                is_primary: membership.is_primary,
                joined_at: membership.joined_at,
            })
            .collect())
    }

    async fn generate_join_code(
        &self,
        user: UserId,
        id: HouseholdId,
    ) -> Result<JoinCodeDto, HouseholdError> {
        self.require_admin_membership(user, id).await?;

        for _ in 0..join_code::MAX_ATTEMPTS {
            let code = random_code();

            // Uniqueness is global across all stored codes, expired included.
            if self.store.join_code_exists(&code).await? {
                continue;
            }

            let expires_at = (chrono::Utc::now()
                + chrono::Duration::milliseconds(join_code::TTL_MS))
            .to_rfc3339();

            let row = self.store.insert_join_code(id, &code, &expires_at).await?;
            return Ok(JoinCodeDto {
                code: row.code,
                expires_at: row.expires_at,
            });
        }

        Err(HouseholdError::CodeExhausted)
    }

    async fn join(
        &self,
        user: UserId,
        code: &str,
    ) -> Result<Option<HouseholdDto>, HouseholdError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(HouseholdError::Validation(
                "Join code cannot be empty".to_string(),
            ));
        }

        if self.store.get_user(user).await?.is_none() {
            return Err(HouseholdError::UserNotFound(user));
        }

        let Some(row) = self.store.find_join_code(code).await? else {
            return Ok(None);
        };

        let expired = parse_expiry(&row.expires_at).is_none_or(|dt| dt < chrono::Utc::now());
        if expired {
            return Ok(None);
        }

        let household = self
            .store
            .get_household(row.household_id)
            .await?
            .ok_or(HouseholdError::NotFound(row.household_id))?;

        // A repeated join is not an error; the composite key guarantees at
        // most one membership row per (user, household) pair.
        if self.store.membership(user, household.id).await?.is_none() {
            self.store
                .add_household_member(user, household.id, false)
                .await?;
            tracing::info!("User {} joined household {}", user, household.id);
        }

        Ok(Some(self.to_dto(household).await?))
    }

    async fn remove_member(
        &self,
        acting: UserId,
        id: HouseholdId,
        member: UserId,
    ) -> Result<(), HouseholdError> {
        if acting == member {
            self.require_membership(acting, id).await?;
        } else {
            self.require_admin_membership(acting, id).await?;
        }

        // Absent membership rows make this a silent no-op.
        let removed = self.store.remove_household_member(member, id).await?;
        if removed {
            tracing::info!("Removed user {} from household {}", member, id);
        }
        Ok(())
    }

    async fn set_primary(&self, user: UserId, id: HouseholdId) -> Result<(), HouseholdError> {
        self.require_membership(user, id).await?;

        let updated = self.store.set_primary_household(user, id).await?;
        if !updated {
            return Err(HouseholdError::NotAMember);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_code_shape() {
        for _ in 0..100 {
            let code = random_code();
            assert_eq!(code.len(), join_code::LENGTH);
            assert!(
                code.bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
            );
        }
    }

    #[test]
    fn test_random_codes_vary() {
        let first = random_code();
        // 36^8 possibilities; a hundred draws repeating would mean a broken RNG.
        let repeated = (0..100).all(|_| random_code() == first);
        assert!(!repeated);
    }

    #[test]
    fn test_expiry_parsing() {
        let past = "2020-01-01T00:00:00+00:00";
        assert!(parse_expiry(past).is_some_and(|dt| dt < chrono::Utc::now()));
        assert!(parse_expiry("garbage").is_none());
    }
}
