use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::info;

use crate::domain::ZoneId;
use crate::entities::{emergency_zones, prelude::*, shelters};

#[derive(Debug, Clone)]
pub struct ZoneInput {
    pub name: String,
    pub zone_type: String,
    pub severity_level: i32,
    pub description: Option<String>,
    /// Serialized GeoJSON polygon
    pub geometry: String,
}

#[derive(Debug, Clone)]
pub struct NewShelter {
    pub room_nr: Option<i64>,
    pub address: String,
    pub municipality: Option<String>,
    pub capacity: i32,
    pub latitude: f64,
    pub longitude: f64,
}

pub struct MapRepository {
    conn: DatabaseConnection,
}

impl MapRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create_zone(&self, input: &ZoneInput) -> Result<emergency_zones::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let row = emergency_zones::ActiveModel {
            name: Set(input.name.clone()),
            zone_type: Set(input.zone_type.clone()),
            severity_level: Set(input.severity_level),
            description: Set(input.description.clone()),
            geometry: Set(input.geometry.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        Ok(row)
    }

    pub async fn get_zone(&self, id: ZoneId) -> Result<Option<emergency_zones::Model>> {
        let row = EmergencyZones::find_by_id(id).one(&self.conn).await?;
        Ok(row)
    }

    pub async fn list_zones(&self) -> Result<Vec<emergency_zones::Model>> {
        let rows = EmergencyZones::find()
            .order_by_asc(emergency_zones::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn update_zone(
        &self,
        id: ZoneId,
        input: &ZoneInput,
    ) -> Result<Option<emergency_zones::Model>> {
        let Some(zone) = EmergencyZones::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: emergency_zones::ActiveModel = zone.into();
        active.name = Set(input.name.clone());
        active.zone_type = Set(input.zone_type.clone());
        active.severity_level = Set(input.severity_level);
        active.description = Set(input.description.clone());
        active.geometry = Set(input.geometry.clone());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active.update(&self.conn).await?;
        Ok(Some(updated))
    }

    pub async fn remove_zone(&self, id: ZoneId) -> Result<bool> {
        let result = EmergencyZones::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// The import is one-shot: it replaces the whole table so re-running it
    /// never duplicates shelters.
    pub async fn replace_shelters(&self, rows: &[NewShelter]) -> Result<usize> {
        let txn = self.conn.begin().await?;

        Shelters::delete_many()
            .filter(shelters::Column::Id.gt(0))
            .exec(&txn)
            .await?;

        let now = chrono::Utc::now().to_rfc3339();
        for shelter in rows {
            shelters::ActiveModel {
                room_nr: Set(shelter.room_nr),
                address: Set(shelter.address.clone()),
                municipality: Set(shelter.municipality.clone()),
                capacity: Set(shelter.capacity),
                latitude: Set(shelter.latitude),
                longitude: Set(shelter.longitude),
                created_at: Set(now.clone()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        info!("Imported {} shelters", rows.len());
        Ok(rows.len())
    }

    pub async fn list_shelters(&self) -> Result<Vec<shelters::Model>> {
        let rows = Shelters::find()
            .order_by_asc(shelters::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }
}
