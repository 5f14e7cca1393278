use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "households")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub latitude: f64,

    pub longitude: f64,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::household_members::Entity")]
    HouseholdMembers,

    #[sea_orm(has_many = "super::household_join_codes::Entity")]
    HouseholdJoinCodes,

    #[sea_orm(has_many = "super::household_items::Entity")]
    HouseholdItems,
}

impl Related<super::household_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HouseholdMembers.def()
    }
}

impl Related<super::household_join_codes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HouseholdJoinCodes.def()
    }
}

impl Related<super::household_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HouseholdItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
