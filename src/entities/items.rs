use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub amount: f64,

    pub unit_id: i32,

    pub category_id: i32,

    /// ISO date (YYYY-MM-DD); items expired before today are excluded from
    /// the preparedness calculation.
    pub expiration_date: Option<String>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::units::Entity",
        from = "Column::UnitId",
        to = "super::units::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Unit,

    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Category,

    #[sea_orm(has_many = "super::household_items::Entity")]
    HouseholdItems,
}

impl Related<super::units::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Unit.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::household_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HouseholdItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
