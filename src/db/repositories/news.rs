use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::info;

use crate::entities::{news_articles, prelude::*};

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub link: String,
    pub content: String,
    pub district: Option<String>,
    pub source: Option<String>,
    pub published_at: Option<String>,
}

pub struct NewsRepository {
    conn: DatabaseConnection,
}

impl NewsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts the article unless its link is already stored. Returns
    /// whether a row was written.
    pub async fn insert_if_new(&self, article: &NewArticle) -> Result<bool> {
        let existing = NewsArticles::find()
            .filter(news_articles::Column::Link.eq(&article.link))
            .count(&self.conn)
            .await?;

        if existing > 0 {
            return Ok(false);
        }

        news_articles::ActiveModel {
            title: Set(article.title.clone()),
            link: Set(article.link.clone()),
            content: Set(article.content.clone()),
            district: Set(article.district.clone()),
            source: Set(article.source.clone()),
            published_at: Set(article.published_at.clone()),
            retrieved_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        Ok(true)
    }

    pub async fn add(&self, article: &NewArticle) -> Result<news_articles::Model> {
        let row = news_articles::ActiveModel {
            title: Set(article.title.clone()),
            link: Set(article.link.clone()),
            content: Set(article.content.clone()),
            district: Set(article.district.clone()),
            source: Set(article.source.clone()),
            published_at: Set(article.published_at.clone()),
            retrieved_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        Ok(row)
    }

    pub async fn list(&self, limit: u64) -> Result<Vec<news_articles::Model>> {
        let rows = NewsArticles::find()
            .order_by_desc(news_articles::Column::RetrievedAt)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn list_by_district(&self, district: &str) -> Result<Vec<news_articles::Model>> {
        let rows = NewsArticles::find()
            .filter(news_articles::Column::District.eq(district))
            .order_by_desc(news_articles::Column::RetrievedAt)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    /// Deletes articles retrieved before the cutoff (RFC3339 UTC, so the
    /// string comparison matches chronological order).
    pub async fn prune_older_than(&self, cutoff: &str) -> Result<u64> {
        let result = NewsArticles::delete_many()
            .filter(news_articles::Column::RetrievedAt.lt(cutoff))
            .exec(&self.conn)
            .await?;

        if result.rows_affected > 0 {
            info!("Pruned {} expired news articles", result.rows_affected);
        }
        Ok(result.rows_affected)
    }
}
