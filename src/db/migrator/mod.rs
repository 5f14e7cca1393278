use sea_orm_migration::prelude::*;

mod m20250210_initial;
mod m20250312_add_news;
mod m20250330_add_map;
mod m20250418_add_email_tokens;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250210_initial::Migration),
            Box::new(m20250312_add_news::Migration),
            Box::new(m20250330_add_map::Migration),
            Box::new(m20250418_add_email_tokens::Migration),
        ]
    }
}
