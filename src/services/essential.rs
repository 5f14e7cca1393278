//! Checks a household's inventory against the recommended self-preparedness
//! supplies. This check matches keywords against item *names* and is
//! intentionally separate from the category-based test in the preparedness
//! score; the two can disagree.

use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::constants::ESSENTIAL_SUPPLIES;
use crate::db::Store;
use crate::domain::HouseholdId;

#[derive(Debug, Error)]
pub enum EssentialError {
    #[error("Household not found: {0}")]
    HouseholdNotFound(HouseholdId),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for EssentialError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EssentialStatus {
    pub name: String,
    pub present: bool,
}

/// One status per catalog entry, in catalog order. Item names are merged
/// case-insensitively and matched by substring, so "stor dyne" counts
/// toward "dyne". Per-person supplies need one unit per household member;
/// everything else just needs to be in stock.
#[must_use]
pub fn evaluate(member_count: u64, inventory: &[(String, f64)]) -> Vec<EssentialStatus> {
    let mut stock: HashMap<String, f64> = HashMap::new();
    for (name, amount) in inventory {
        *stock.entry(name.to_lowercase()).or_insert(0.0) += amount;
    }

    ESSENTIAL_SUPPLIES
        .iter()
        .map(|(keyword, per_person)| {
            let total: f64 = stock
                .iter()
                .filter(|(name, _)| name.contains(keyword))
                .map(|(_, amount)| amount)
                .sum();

            #[allow(clippy::cast_precision_loss)]
            let present = if *per_person {
                total >= member_count as f64
            } else {
                total > 0.0
            };

            EssentialStatus {
                name: (*keyword).to_string(),
                present,
            }
        })
        .collect()
}

pub struct EssentialItemService {
    store: Store,
}

impl EssentialItemService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn status_for_household(
        &self,
        household_id: HouseholdId,
    ) -> Result<Vec<EssentialStatus>, EssentialError> {
        if self.store.get_household(household_id).await?.is_none() {
            return Err(EssentialError::HouseholdNotFound(household_id));
        }

        let member_count = self.store.household_member_count(household_id).await?;
        let stock = self.store.stock_for_household(household_id).await?;

        let inventory: Vec<(String, f64)> = stock
            .into_iter()
            .map(|row| (row.name, row.amount))
            .collect();

        Ok(evaluate(member_count, &inventory))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of<'a>(statuses: &'a [EssentialStatus], name: &str) -> &'a EssentialStatus {
        statuses
            .iter()
            .find(|s| s.name == name)
            .unwrap_or_else(|| panic!("missing catalog entry {name}"))
    }

    #[test]
    fn test_catalog_order_and_size() {
        let statuses = evaluate(1, &[]);
        assert_eq!(statuses.len(), ESSENTIAL_SUPPLIES.len());
        for (status, (keyword, _)) in statuses.iter().zip(ESSENTIAL_SUPPLIES) {
            assert_eq!(status.name, *keyword);
        }
    }

    #[test]
    fn test_per_person_rule_for_sleeping_bags() {
        let inventory = vec![("stor sovepose".to_string(), 1.0)];

        let one_member = evaluate(1, &inventory);
        assert!(status_of(&one_member, "sovepose").present);

        let three_members = evaluate(3, &inventory);
        assert!(!status_of(&three_members, "sovepose").present);
    }

    #[test]
    fn test_substring_match_counts_prefixed_names() {
        let inventory = vec![
            ("Stor dyne".to_string(), 1.0),
            ("dyne til barn".to_string(), 1.0),
        ];
        let statuses = evaluate(2, &inventory);
        assert!(status_of(&statuses, "dyne").present);
    }

    #[test]
    fn test_names_merge_case_insensitively() {
        let inventory = vec![
            ("Sovepose".to_string(), 1.0),
            ("sovepose".to_string(), 1.0),
        ];
        let statuses = evaluate(2, &inventory);
        assert!(status_of(&statuses, "sovepose").present);
    }

    #[test]
    fn test_plain_essentials_need_any_stock() {
        let inventory = vec![("Førstehjelpsskrin".to_string(), 1.0)];
        let statuses = evaluate(5, &inventory);
        assert!(status_of(&statuses, "førstehjelp").present);
        assert!(!status_of(&statuses, "lommelykt").present);
    }
}
