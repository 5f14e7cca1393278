pub use super::categories::Entity as Categories;
pub use super::email_tokens::Entity as EmailTokens;
pub use super::emergency_zones::Entity as EmergencyZones;
pub use super::household_items::Entity as HouseholdItems;
pub use super::household_join_codes::Entity as HouseholdJoinCodes;
pub use super::household_members::Entity as HouseholdMembers;
pub use super::households::Entity as Households;
pub use super::items::Entity as Items;
pub use super::news_articles::Entity as NewsArticles;
pub use super::shelters::Entity as Shelters;
pub use super::units::Entity as Units;
pub use super::users::Entity as Users;
