use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use std::collections::HashMap;

use crate::domain::{HouseholdId, ItemId};
use crate::entities::{categories, household_items, items, prelude::*, units};

/// Inventory row joined with its unit and category, as consumed by the
/// preparedness and essential-supply calculations.
#[derive(Debug, Clone)]
pub struct StockRow {
    pub item_id: ItemId,
    pub name: String,
    pub amount: f64,
    pub unit_name: String,
    pub category_name: String,
    pub kcal_per_unit: Option<f64>,
    pub is_essential: bool,
    pub expiration_date: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ItemInput {
    pub name: String,
    pub amount: f64,
    pub unit_id: i32,
    pub category_id: i32,
    pub expiration_date: Option<String>,
    pub household_ids: Vec<HouseholdId>,
}

pub struct ItemRepository {
    conn: DatabaseConnection,
}

impl ItemRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn unit_map(&self) -> Result<HashMap<i32, units::Model>> {
        let rows = Units::find().all(&self.conn).await?;
        Ok(rows.into_iter().map(|u| (u.id, u)).collect())
    }

    async fn category_map(&self) -> Result<HashMap<i32, categories::Model>> {
        let rows = Categories::find().all(&self.conn).await?;
        Ok(rows.into_iter().map(|c| (c.id, c)).collect())
    }

    /// Inserts the item and its household associations in one transaction.
    pub async fn create(&self, input: &ItemInput) -> Result<items::Model> {
        let txn = self.conn.begin().await?;

        let item = items::ActiveModel {
            name: Set(input.name.clone()),
            amount: Set(input.amount),
            unit_id: Set(input.unit_id),
            category_id: Set(input.category_id),
            expiration_date: Set(input.expiration_date.clone()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for household_id in &input.household_ids {
            household_items::ActiveModel {
                household_id: Set(*household_id),
                item_id: Set(item.id),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(item)
    }

    pub async fn get(&self, id: ItemId) -> Result<Option<items::Model>> {
        let item = Items::find_by_id(id).one(&self.conn).await?;
        Ok(item)
    }

    pub async fn households_for_item(&self, item_id: ItemId) -> Result<Vec<HouseholdId>> {
        let rows = HouseholdItems::find()
            .filter(household_items::Column::ItemId.eq(item_id))
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(|r| r.household_id).collect())
    }

    pub async fn items_for_household(
        &self,
        household_id: HouseholdId,
    ) -> Result<Vec<(items::Model, Option<units::Model>, Option<categories::Model>)>> {
        let links = HouseholdItems::find()
            .filter(household_items::Column::HouseholdId.eq(household_id))
            .all(&self.conn)
            .await?;

        let ids: Vec<ItemId> = links.into_iter().map(|l| l.item_id).collect();
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = Items::find()
            .filter(items::Column::Id.is_in(ids))
            .all(&self.conn)
            .await?;

        let units = self.unit_map().await?;
        let categories = self.category_map().await?;

        Ok(rows
            .into_iter()
            .map(|item| {
                let unit = units.get(&item.unit_id).cloned();
                let category = categories.get(&item.category_id).cloned();
                (item, unit, category)
            })
            .collect())
    }

    pub async fn stock_for_household(&self, household_id: HouseholdId) -> Result<Vec<StockRow>> {
        let rows = self.items_for_household(household_id).await?;

        Ok(rows
            .into_iter()
            .map(|(item, unit, category)| StockRow {
                item_id: item.id,
                name: item.name,
                amount: item.amount,
                unit_name: unit.map(|u| u.name_no).unwrap_or_default(),
                category_name: category
                    .as_ref()
                    .map(|c| c.name_no.clone())
                    .unwrap_or_default(),
                kcal_per_unit: category.as_ref().and_then(|c| c.kcal_per_unit),
                is_essential: category.as_ref().is_some_and(|c| c.is_essential),
                expiration_date: item.expiration_date,
            })
            .collect())
    }

    /// Replaces the item's scalar fields and its full household-association
    /// list in one transaction.
    pub async fn update(&self, id: ItemId, input: &ItemInput) -> Result<Option<items::Model>> {
        let Some(item) = Items::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let txn = self.conn.begin().await?;

        let mut active: items::ActiveModel = item.into();
        active.name = Set(input.name.clone());
        active.amount = Set(input.amount);
        active.unit_id = Set(input.unit_id);
        active.category_id = Set(input.category_id);
        active.expiration_date = Set(input.expiration_date.clone());
        let updated = active.update(&txn).await?;

        HouseholdItems::delete_many()
            .filter(household_items::Column::ItemId.eq(id))
            .exec(&txn)
            .await?;

        for household_id in &input.household_ids {
            household_items::ActiveModel {
                household_id: Set(*household_id),
                item_id: Set(id),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(Some(updated))
    }

    /// Clears the household associations before removing the row, so the
    /// join table never holds dangling references.
    pub async fn remove(&self, id: ItemId) -> Result<bool> {
        let txn = self.conn.begin().await?;

        HouseholdItems::delete_many()
            .filter(household_items::Column::ItemId.eq(id))
            .exec(&txn)
            .await?;

        let result = Items::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }
}
