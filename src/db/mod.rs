use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::domain::{HouseholdId, ItemId, Role, UserId, ZoneId};
use crate::entities::{
    categories, emergency_zones, household_join_codes, household_members, households, items,
    news_articles, shelters, units, users,
};

pub mod migrator;
pub mod repositories;

pub use repositories::item::{ItemInput, StockRow};
pub use repositories::map::{NewShelter, ZoneInput};
pub use repositories::news::NewArticle;
pub use repositories::user::{NewUser, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let is_memory = db_url.contains(":memory:");

        if !is_memory {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // A pooled in-memory SQLite gives every connection its own empty
        // database; pin the pool to one connection instead.
        let max_connections = if is_memory { 1 } else { max_connections };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn household_repo(&self) -> repositories::household::HouseholdRepository {
        repositories::household::HouseholdRepository::new(self.conn.clone())
    }

    fn item_repo(&self) -> repositories::item::ItemRepository {
        repositories::item::ItemRepository::new(self.conn.clone())
    }

    fn catalog_repo(&self) -> repositories::catalog::CatalogRepository {
        repositories::catalog::CatalogRepository::new(self.conn.clone())
    }

    fn news_repo(&self) -> repositories::news::NewsRepository {
        repositories::news::NewsRepository::new(self.conn.clone())
    }

    fn map_repo(&self) -> repositories::map::MapRepository {
        repositories::map::MapRepository::new(self.conn.clone())
    }

    fn token_repo(&self) -> repositories::token::TokenRepository {
        repositories::token::TokenRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn create_user(&self, new_user: NewUser, config: &SecurityConfig) -> Result<User> {
        self.user_repo().create(new_user, config).await
    }

    pub async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn email_in_use(&self, email: &str) -> Result<bool> {
        self.user_repo().email_in_use(email).await
    }

    pub async fn phone_in_use(&self, phone: &str) -> Result<bool> {
        self.user_repo().phone_in_use(phone).await
    }

    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn update_user_password(
        &self,
        user_id: UserId,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(user_id, new_password, config)
            .await
    }

    pub async fn set_user_role(&self, user_id: UserId, role: Role) -> Result<()> {
        self.user_repo().set_role(user_id, role).await
    }

    pub async fn set_user_email_verified(&self, user_id: UserId, verified: bool) -> Result<()> {
        self.user_repo().set_email_verified(user_id, verified).await
    }

    pub async fn remove_user(&self, user_id: UserId) -> Result<bool> {
        self.user_repo().remove(user_id).await
    }

    pub async fn list_privileged_users(&self) -> Result<Vec<User>> {
        self.user_repo().list_privileged().await
    }

    pub async fn count_superadmins(&self) -> Result<u64> {
        self.user_repo().count_superadmins().await
    }

    // ========== Households & membership ==========

    pub async fn create_household(
        &self,
        name: &str,
        latitude: f64,
        longitude: f64,
        creator: UserId,
    ) -> Result<households::Model> {
        self.household_repo()
            .create_with_admin(name, latitude, longitude, creator)
            .await
    }

    pub async fn get_household(&self, id: HouseholdId) -> Result<Option<households::Model>> {
        self.household_repo().get(id).await
    }

    pub async fn remove_household(&self, id: HouseholdId) -> Result<bool> {
        self.household_repo().remove(id).await
    }

    pub async fn households_for_user(&self, user_id: UserId) -> Result<Vec<households::Model>> {
        self.household_repo().list_for_user(user_id).await
    }

    pub async fn household_members(
        &self,
        household_id: HouseholdId,
    ) -> Result<Vec<(household_members::Model, users::Model)>> {
        self.household_repo().members(household_id).await
    }

    pub async fn household_member_count(&self, household_id: HouseholdId) -> Result<u64> {
        self.household_repo().member_count(household_id).await
    }

    pub async fn membership(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
    ) -> Result<Option<household_members::Model>> {
        self.household_repo().membership(user_id, household_id).await
    }

    pub async fn add_household_member(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
        is_admin: bool,
    ) -> Result<household_members::Model> {
        self.household_repo()
            .add_member(user_id, household_id, is_admin)
            .await
    }

    pub async fn remove_household_member(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
    ) -> Result<bool> {
        self.household_repo()
            .remove_member(user_id, household_id)
            .await
    }

    pub async fn set_primary_household(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
    ) -> Result<bool> {
        self.household_repo().set_primary(user_id, household_id).await
    }

    pub async fn join_code_exists(&self, code: &str) -> Result<bool> {
        self.household_repo().code_exists(code).await
    }

    pub async fn insert_join_code(
        &self,
        household_id: HouseholdId,
        code: &str,
        expires_at: &str,
    ) -> Result<household_join_codes::Model> {
        self.household_repo()
            .insert_code(household_id, code, expires_at)
            .await
    }

    pub async fn find_join_code(&self, code: &str) -> Result<Option<household_join_codes::Model>> {
        self.household_repo().find_code(code).await
    }

    // ========== Items ==========

    pub async fn create_item(&self, input: &ItemInput) -> Result<items::Model> {
        self.item_repo().create(input).await
    }

    pub async fn get_item(&self, id: ItemId) -> Result<Option<items::Model>> {
        self.item_repo().get(id).await
    }

    pub async fn households_for_item(&self, item_id: ItemId) -> Result<Vec<HouseholdId>> {
        self.item_repo().households_for_item(item_id).await
    }

    pub async fn items_for_household(
        &self,
        household_id: HouseholdId,
    ) -> Result<Vec<(items::Model, Option<units::Model>, Option<categories::Model>)>> {
        self.item_repo().items_for_household(household_id).await
    }

    pub async fn stock_for_household(&self, household_id: HouseholdId) -> Result<Vec<StockRow>> {
        self.item_repo().stock_for_household(household_id).await
    }

    pub async fn update_item(
        &self,
        id: ItemId,
        input: &ItemInput,
    ) -> Result<Option<items::Model>> {
        self.item_repo().update(id, input).await
    }

    pub async fn remove_item(&self, id: ItemId) -> Result<bool> {
        self.item_repo().remove(id).await
    }

    // ========== Catalog ==========

    pub async fn list_categories(&self) -> Result<Vec<categories::Model>> {
        self.catalog_repo().list_categories().await
    }

    pub async fn get_category(&self, id: i32) -> Result<Option<categories::Model>> {
        self.catalog_repo().get_category(id).await
    }

    pub async fn list_units(&self) -> Result<Vec<units::Model>> {
        self.catalog_repo().list_units().await
    }

    pub async fn get_unit(&self, id: i32) -> Result<Option<units::Model>> {
        self.catalog_repo().get_unit(id).await
    }

    // ========== News ==========

    pub async fn insert_article_if_new(&self, article: &NewArticle) -> Result<bool> {
        self.news_repo().insert_if_new(article).await
    }

    pub async fn add_article(&self, article: &NewArticle) -> Result<news_articles::Model> {
        self.news_repo().add(article).await
    }

    pub async fn list_articles(&self, limit: u64) -> Result<Vec<news_articles::Model>> {
        self.news_repo().list(limit).await
    }

    pub async fn list_articles_by_district(
        &self,
        district: &str,
    ) -> Result<Vec<news_articles::Model>> {
        self.news_repo().list_by_district(district).await
    }

    pub async fn prune_articles_older_than(&self, cutoff: &str) -> Result<u64> {
        self.news_repo().prune_older_than(cutoff).await
    }

    // ========== Map ==========

    pub async fn create_zone(&self, input: &ZoneInput) -> Result<emergency_zones::Model> {
        self.map_repo().create_zone(input).await
    }

    pub async fn get_zone(&self, id: ZoneId) -> Result<Option<emergency_zones::Model>> {
        self.map_repo().get_zone(id).await
    }

    pub async fn list_zones(&self) -> Result<Vec<emergency_zones::Model>> {
        self.map_repo().list_zones().await
    }

    pub async fn update_zone(
        &self,
        id: ZoneId,
        input: &ZoneInput,
    ) -> Result<Option<emergency_zones::Model>> {
        self.map_repo().update_zone(id, input).await
    }

    pub async fn remove_zone(&self, id: ZoneId) -> Result<bool> {
        self.map_repo().remove_zone(id).await
    }

    pub async fn replace_shelters(&self, rows: &[NewShelter]) -> Result<usize> {
        self.map_repo().replace_shelters(rows).await
    }

    pub async fn list_shelters(&self) -> Result<Vec<shelters::Model>> {
        self.map_repo().list_shelters().await
    }

    // ========== Email tokens ==========

    pub async fn issue_email_token(
        &self,
        user_id: UserId,
        token: &str,
        purpose: &str,
        expires_at: &str,
    ) -> Result<crate::entities::email_tokens::Model> {
        self.token_repo()
            .issue(user_id, token, purpose, expires_at)
            .await
    }

    pub async fn find_email_token(
        &self,
        token: &str,
    ) -> Result<Option<crate::entities::email_tokens::Model>> {
        self.token_repo().find(token).await
    }

    pub async fn consume_email_token(&self, id: i32) -> Result<()> {
        self.token_repo().consume(id).await
    }

    pub async fn prune_expired_email_tokens(&self) -> Result<u64> {
        self.token_repo()
            .prune_expired(&chrono::Utc::now().to_rfc3339())
            .await
    }
}
