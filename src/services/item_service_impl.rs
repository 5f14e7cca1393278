//! `SeaORM` implementation of the `ItemService` trait.

use async_trait::async_trait;

use crate::db::{ItemInput, Store};
use crate::domain::{HouseholdId, ItemId, UserId};
use crate::entities::{categories, items, units};
use crate::services::item_service::{
    CategoryDto, ItemDto, ItemError, ItemService, ItemWrite, UnitDto,
};

fn validate_write(input: &ItemWrite) -> Result<(), ItemError> {
    if input.name.trim().is_empty() {
        return Err(ItemError::Validation("Item name cannot be empty".to_string()));
    }

    if input.amount <= 0.0 || !input.amount.is_finite() {
        return Err(ItemError::Validation(
            "Amount must be a positive number".to_string(),
        ));
    }

    if input.household_ids.is_empty() {
        return Err(ItemError::Validation(
            "Item must belong to at least one household".to_string(),
        ));
    }

    if let Some(date) = &input.expiration_date
        && chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err()
    {
        return Err(ItemError::Validation(
            "Expiration date must be an ISO date (YYYY-MM-DD)".to_string(),
        ));
    }

    Ok(())
}

fn unit_dto(unit: units::Model) -> UnitDto {
    UnitDto {
        id: unit.id,
        name_no: unit.name_no,
        name_en: unit.name_en,
    }
}

fn category_dto(category: categories::Model) -> CategoryDto {
    CategoryDto {
        id: category.id,
        name_no: category.name_no,
        name_en: category.name_en,
        kcal_per_unit: category.kcal_per_unit,
        is_essential: category.is_essential,
    }
}

pub struct SeaOrmItemService {
    store: Store,
}

impl SeaOrmItemService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Checks that every household exists and that the user belongs to each.
    async fn require_memberships(
        &self,
        user: UserId,
        household_ids: &[HouseholdId],
    ) -> Result<(), ItemError> {
        for household_id in household_ids {
            if self.store.get_household(*household_id).await?.is_none() {
                return Err(ItemError::HouseholdNotFound(*household_id));
            }

            if self.store.membership(user, *household_id).await?.is_none() {
                return Err(ItemError::NotAMember(*household_id));
            }
        }
        Ok(())
    }

    async fn require_any_membership(
        &self,
        user: UserId,
        household_ids: &[HouseholdId],
    ) -> Result<(), ItemError> {
        for household_id in household_ids {
            if self.store.membership(user, *household_id).await?.is_some() {
                return Ok(());
            }
        }

        household_ids
            .first()
            .map_or(Err(ItemError::Validation("Item has no household".to_string())), |id| {
                Err(ItemError::NotAMember(*id))
            })
    }

    async fn require_catalog_refs(&self, input: &ItemWrite) -> Result<(), ItemError> {
        if self.store.get_unit(input.unit_id).await?.is_none() {
            return Err(ItemError::UnknownUnit(input.unit_id));
        }

        if self.store.get_category(input.category_id).await?.is_none() {
            return Err(ItemError::UnknownCategory(input.category_id));
        }

        Ok(())
    }

    async fn to_dto(&self, item: items::Model) -> Result<ItemDto, ItemError> {
        let unit = self.store.get_unit(item.unit_id).await?;
        let category = self.store.get_category(item.category_id).await?;
        let household_ids = self.store.households_for_item(item.id).await?;

        Ok(ItemDto {
            id: item.id,
            name: item.name,
            amount: item.amount,
            unit: unit.map(unit_dto),
            category: category.map(category_dto),
            expiration_date: item.expiration_date,
            household_ids,
        })
    }
}

#[async_trait]
impl ItemService for SeaOrmItemService {
    async fn list_for_household(
        &self,
        user: UserId,
        household_id: HouseholdId,
    ) -> Result<Vec<ItemDto>, ItemError> {
        if self.store.get_household(household_id).await?.is_none() {
            return Err(ItemError::HouseholdNotFound(household_id));
        }

        if self.store.membership(user, household_id).await?.is_none() {
            return Err(ItemError::NotAMember(household_id));
        }

        let rows = self.store.items_for_household(household_id).await?;

        let mut dtos = Vec::with_capacity(rows.len());
        for (item, unit, category) in rows {
            let household_ids = self.store.households_for_item(item.id).await?;
            dtos.push(ItemDto {
                id: item.id,
                name: item.name,
                amount: item.amount,
                unit: unit.map(unit_dto),
                category: category.map(category_dto),
                expiration_date: item.expiration_date,
                household_ids,
            });
        }
        Ok(dtos)
    }

    async fn get(&self, user: UserId, id: ItemId) -> Result<ItemDto, ItemError> {
        let item = self.store.get_item(id).await?.ok_or(ItemError::NotFound(id))?;

        let owners = self.store.households_for_item(id).await?;
        if owners.is_empty() {
            return Err(ItemError::NotFound(id));
        }
        self.require_any_membership(user, &owners).await?;

        self.to_dto(item).await
    }

    async fn create(&self, user: UserId, input: ItemWrite) -> Result<ItemDto, ItemError> {
        validate_write(&input)?;
        self.require_memberships(user, &input.household_ids).await?;
        self.require_catalog_refs(&input).await?;

        let item = self
            .store
            .create_item(&ItemInput {
                name: input.name.trim().to_string(),
                amount: input.amount,
                unit_id: input.unit_id,
                category_id: input.category_id,
                expiration_date: input.expiration_date,
                household_ids: input.household_ids,
            })
            .await?;

        self.to_dto(item).await
    }

    async fn update(
        &self,
        user: UserId,
        id: ItemId,
        input: ItemWrite,
    ) -> Result<ItemDto, ItemError> {
        validate_write(&input)?;

        if self.store.get_item(id).await?.is_none() {
            return Err(ItemError::NotFound(id));
        }

        let current_owners = self.store.households_for_item(id).await?;
        self.require_memberships(user, &current_owners).await?;
        self.require_memberships(user, &input.household_ids).await?;
        self.require_catalog_refs(&input).await?;

        let updated = self
            .store
            .update_item(
                id,
                &ItemInput {
                    name: input.name.trim().to_string(),
                    amount: input.amount,
                    unit_id: input.unit_id,
                    category_id: input.category_id,
                    expiration_date: input.expiration_date,
                    household_ids: input.household_ids,
                },
            )
            .await?
            .ok_or(ItemError::NotFound(id))?;

        self.to_dto(updated).await
    }

    async fn delete(&self, user: UserId, id: ItemId) -> Result<(), ItemError> {
        if self.store.get_item(id).await?.is_none() {
            return Err(ItemError::NotFound(id));
        }

        let owners = self.store.households_for_item(id).await?;
        self.require_memberships(user, &owners).await?;

        self.store.remove_item(id).await?;
        tracing::info!("Deleted item {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write() -> ItemWrite {
        ItemWrite {
            name: "Hermetisk suppe".to_string(),
            amount: 4.0,
            unit_id: 2,
            category_id: 2,
            expiration_date: Some("2027-05-01".to_string()),
            household_ids: vec![1],
        }
    }

    #[test]
    fn test_valid_write_passes() {
        assert!(validate_write(&write()).is_ok());
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let mut bad = write();
        bad.amount = 0.0;
        assert!(validate_write(&bad).is_err());

        bad.amount = -1.5;
        assert!(validate_write(&bad).is_err());
    }

    #[test]
    fn test_rejects_empty_household_list() {
        let mut bad = write();
        bad.household_ids.clear();
        assert!(validate_write(&bad).is_err());
    }

    #[test]
    fn test_rejects_malformed_expiration() {
        let mut bad = write();
        bad.expiration_date = Some("01.05.2027".to_string());
        assert!(validate_write(&bad).is_err());
    }
}
