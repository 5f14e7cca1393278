pub mod prelude;

pub mod categories;
pub mod email_tokens;
pub mod emergency_zones;
pub mod household_items;
pub mod household_join_codes;
pub mod household_members;
pub mod households;
pub mod items;
pub mod news_articles;
pub mod shelters;
pub mod units;
pub mod users;
