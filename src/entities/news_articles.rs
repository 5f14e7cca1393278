use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "news_articles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    /// Canonical article URL; ingestion dedups on this.
    #[sea_orm(unique)]
    pub link: String,

    pub content: String,

    pub district: Option<String>,

    pub source: Option<String>,

    pub published_at: Option<String>,

    pub retrieved_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
