use anyhow::Result;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};

use crate::entities::{categories, prelude::*, units};

/// Read access to the seeded category and unit reference tables.
pub struct CatalogRepository {
    conn: DatabaseConnection,
}

impl CatalogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_categories(&self) -> Result<Vec<categories::Model>> {
        let rows = Categories::find()
            .order_by_asc(categories::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn get_category(&self, id: i32) -> Result<Option<categories::Model>> {
        let row = Categories::find_by_id(id).one(&self.conn).await?;
        Ok(row)
    }

    pub async fn list_units(&self) -> Result<Vec<units::Model>> {
        let rows = Units::find()
            .order_by_asc(units::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn get_unit(&self, id: i32) -> Result<Option<units::Model>> {
        let row = Units::find_by_id(id).one(&self.conn).await?;
        Ok(row)
    }
}
