use sea_orm::entity::prelude::*;

/// Public shelter imported from the bundled GeoJSON dataset. Coordinates
/// are WGS84, converted from the dataset's UTM zone 33 values at import.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shelters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub room_nr: Option<i64>,

    pub address: String,

    pub municipality: Option<String>,

    pub capacity: i32,

    pub latitude: f64,

    pub longitude: f64,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
