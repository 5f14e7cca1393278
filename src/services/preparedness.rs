//! Aggregate readiness score: kilocalorie and water coverage against 3-day
//! and 7-day survival thresholds, plus a check for required essential
//! categories. A deterministic, pure function over an inventory snapshot.

use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

use crate::constants::preparedness::{
    FULL_HORIZON_DAYS, KCAL_PER_PERSON_PER_DAY, LITRES_PER_PERSON_PER_DAY, MSG_BELOW_3_DAYS,
    MSG_BELOW_7_DAYS, MSG_COVERED, MSG_NO_MEMBERS, REQUIRED_CATEGORIES, SHORT_HORIZON_DAYS,
};
use crate::db::{StockRow, Store};
use crate::domain::HouseholdId;

#[derive(Debug, Error)]
pub enum PreparednessError {
    #[error("Household not found: {0}")]
    HouseholdNotFound(HouseholdId),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for PreparednessError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PreparednessReport {
    /// min(kcal coverage, water coverage) against the 7-day requirement,
    /// capped at 100.
    pub percentage: i32,
    pub kcal_percentage: i32,
    pub water_percentage: i32,
    pub warning: bool,
    pub message: String,
}

fn is_water(row: &StockRow) -> bool {
    row.category_name.trim().to_lowercase() == "vann"
        && row.unit_name.trim().to_lowercase() == "l"
}

fn is_expired(row: &StockRow, today: chrono::NaiveDate) -> bool {
    row.expiration_date
        .as_deref()
        .and_then(|raw| chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .is_some_and(|date| date < today)
}

#[allow(clippy::cast_possible_truncation)]
fn as_percent(part: f64, whole: f64) -> i32 {
    (part / whole * 100.0).min(100.0).round() as i32
}

/// Scores a snapshot of inventory for a household of `member_count` people.
/// Items expired strictly before `today` are ignored.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn assess(member_count: u64, stock: &[StockRow], today: chrono::NaiveDate) -> PreparednessReport {
    if member_count == 0 {
        return PreparednessReport {
            percentage: 0,
            kcal_percentage: 0,
            water_percentage: 0,
            warning: true,
            message: MSG_NO_MEMBERS.to_string(),
        };
    }

    let members = member_count as f64;
    let kcal_3_days = members * SHORT_HORIZON_DAYS * KCAL_PER_PERSON_PER_DAY;
    let kcal_7_days = members * FULL_HORIZON_DAYS * KCAL_PER_PERSON_PER_DAY;
    let water_3_days = members * SHORT_HORIZON_DAYS * LITRES_PER_PERSON_PER_DAY;
    let water_7_days = members * FULL_HORIZON_DAYS * LITRES_PER_PERSON_PER_DAY;

    let mut total_kcal = 0.0;
    let mut total_litres = 0.0;
    let mut essential_categories: HashSet<&str> = HashSet::new();

    for row in stock {
        if is_expired(row, today) {
            continue;
        }

        if is_water(row) {
            total_litres += row.amount;
        } else if let Some(factor) = row.kcal_per_unit {
            total_kcal += row.amount * factor;
        }

        if row.is_essential {
            essential_categories.insert(row.category_name.as_str());
        }
    }

    // Checked against category names; independent of the keyword-based
    // essential-supply listing.
    let has_essentials = REQUIRED_CATEGORIES
        .iter()
        .all(|name| essential_categories.contains(name));

    let kcal_fraction = total_kcal / kcal_7_days;
    let water_fraction = total_litres / water_7_days;
    let percentage = (kcal_fraction.min(water_fraction) * 100.0).min(100.0).round() as i32;

    let below_3_days = total_kcal < kcal_3_days || total_litres < water_3_days;
    let below_7_days = total_kcal < kcal_7_days || total_litres < water_7_days;

    let message = if below_3_days {
        MSG_BELOW_3_DAYS
    } else if below_7_days {
        MSG_BELOW_7_DAYS
    } else {
        MSG_COVERED
    };

    PreparednessReport {
        percentage,
        kcal_percentage: as_percent(total_kcal, kcal_7_days),
        water_percentage: as_percent(total_litres, water_7_days),
        warning: below_3_days || !has_essentials,
        message: message.to_string(),
    }
}

pub struct PreparednessService {
    store: Store,
}

impl PreparednessService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn assess_household(
        &self,
        household_id: HouseholdId,
    ) -> Result<PreparednessReport, PreparednessError> {
        if self.store.get_household(household_id).await?.is_none() {
            return Err(PreparednessError::HouseholdNotFound(household_id));
        }

        let member_count = self.store.household_member_count(household_id).await?;
        let stock = self.store.stock_for_household(household_id).await?;
        let today = chrono::Utc::now().date_naive();

        Ok(assess(member_count, &stock, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> chrono::NaiveDate {
        chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn water(amount: f64) -> StockRow {
        StockRow {
            item_id: 1,
            name: "Vann".to_string(),
            amount,
            unit_name: "l".to_string(),
            category_name: "Vann".to_string(),
            kcal_per_unit: None,
            is_essential: false,
            expiration_date: None,
        }
    }

    fn food(amount: f64, kcal_per_unit: f64) -> StockRow {
        StockRow {
            item_id: 2,
            name: "Hermetikk".to_string(),
            amount,
            unit_name: "stk".to_string(),
            category_name: "Hermetikk".to_string(),
            kcal_per_unit: Some(kcal_per_unit),
            is_essential: false,
            expiration_date: None,
        }
    }

    fn equipment(category: &str) -> StockRow {
        StockRow {
            item_id: 3,
            name: category.to_string(),
            amount: 1.0,
            unit_name: "stk".to_string(),
            category_name: category.to_string(),
            kcal_per_unit: None,
            is_essential: true,
            expiration_date: None,
        }
    }

    #[test]
    fn test_zero_members_is_terminal() {
        let stock = vec![water(1000.0), food(1000.0, 400.0)];
        let report = assess(0, &stock, today());
        assert_eq!(report.percentage, 0);
        assert!(report.warning);
        assert_eq!(report.message, MSG_NO_MEMBERS);
    }

    #[test]
    fn test_worked_example_two_members_forty_litres() {
        // 2 members: 7-day water requirement is 42 l, so 40 l covers ~95%;
        // no food at all pins the overall score at 0.
        let stock = vec![water(40.0)];
        let report = assess(2, &stock, today());

        assert_eq!(report.water_percentage, 95);
        assert_eq!(report.kcal_percentage, 0);
        assert_eq!(report.percentage, 0);
        assert!(report.warning);
        assert_eq!(report.message, MSG_BELOW_3_DAYS);
    }

    #[test]
    fn test_fully_covered_household() {
        // 2 members: 28000 kcal and 42 l for seven days.
        let stock = vec![
            water(42.0),
            food(70.0, 400.0),
            equipment("Førstehjelp"),
            equipment("Gassbrenner"),
        ];
        let report = assess(2, &stock, today());

        assert_eq!(report.percentage, 100);
        assert!(!report.warning);
        assert_eq!(report.message, MSG_COVERED);
    }

    #[test]
    fn test_between_three_and_seven_days() {
        // 1 member: 3-day needs are 6000 kcal / 9 l; 7-day needs 14000 / 21.
        let stock = vec![
            water(10.0),
            food(20.0, 400.0),
            equipment("Førstehjelp"),
            equipment("Gassbrenner"),
        ];
        let report = assess(1, &stock, today());

        assert!(report.percentage < 100);
        assert!(!report.warning);
        assert_eq!(report.message, MSG_BELOW_7_DAYS);
    }

    #[test]
    fn test_missing_essentials_warns_even_when_covered() {
        let stock = vec![water(42.0), food(70.0, 400.0)];
        let report = assess(2, &stock, today());

        assert_eq!(report.percentage, 100);
        assert!(report.warning);
        // Message reflects coverage only; the warning flag carries the
        // essentials signal.
        assert_eq!(report.message, MSG_COVERED);
    }

    #[test]
    fn test_one_required_category_is_not_enough() {
        let stock = vec![water(42.0), food(70.0, 400.0), equipment("Førstehjelp")];
        let report = assess(2, &stock, today());
        assert!(report.warning);
    }

    #[test]
    fn test_expired_items_are_ignored() {
        let mut expired = food(70.0, 400.0);
        expired.expiration_date = Some("2025-05-31".to_string());

        let stock = vec![water(42.0), expired];
        let report = assess(2, &stock, today());
        assert_eq!(report.kcal_percentage, 0);
        assert_eq!(report.message, MSG_BELOW_3_DAYS);
    }

    #[test]
    fn test_expiring_today_still_counts() {
        let mut edge = food(70.0, 400.0);
        edge.expiration_date = Some("2025-06-01".to_string());

        let stock = vec![water(42.0), edge];
        let report = assess(2, &stock, today());
        assert_eq!(report.kcal_percentage, 100);
    }

    #[test]
    fn test_water_requires_litre_unit() {
        // "Vann" measured in pieces is not drinking-water volume.
        let mut bottled = water(42.0);
        bottled.unit_name = "stk".to_string();

        let report = assess(2, &[bottled], today());
        assert_eq!(report.water_percentage, 0);
    }

    #[test]
    fn test_percentage_is_capped_at_hundred() {
        let stock = vec![
            water(500.0),
            food(500.0, 400.0),
            equipment("Førstehjelp"),
            equipment("Gassbrenner"),
        ];
        let report = assess(1, &stock, today());
        assert_eq!(report.percentage, 100);
        assert_eq!(report.kcal_percentage, 100);
        assert_eq!(report.water_percentage, 100);
    }
}
