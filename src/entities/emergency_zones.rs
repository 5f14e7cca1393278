use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "emergency_zones")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    /// e.g. "flom", "skred", "storm"
    pub zone_type: String,

    pub severity_level: i32,

    pub description: Option<String>,

    /// GeoJSON polygon as serialized JSON (WGS84 lon/lat rings).
    pub geometry: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
