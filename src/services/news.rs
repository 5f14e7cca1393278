//! Domain service for the emergency-news feed: periodic RSS ingestion,
//! district filtering and the expiry sweep.

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::clients::feed::FeedClient;
use crate::config::Config;
use crate::db::{NewArticle, Store};
use crate::entities::news_articles;

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for NewsError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsDto {
    pub id: i32,
    pub title: String,
    pub link: String,
    pub content: String,
    pub district: Option<String>,
    pub source: Option<String>,
    pub published_at: Option<String>,
    pub retrieved_at: String,
}

impl From<news_articles::Model> for NewsDto {
    fn from(model: news_articles::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            link: model.link,
            content: model.content,
            district: model.district,
            source: model.source,
            published_at: model.published_at,
            retrieved_at: model.retrieved_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ManualArticle {
    pub title: String,
    pub link: String,
    pub content: String,
    pub district: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct NewsRefreshStats {
    pub feeds_checked: u32,
    pub feeds_failed: u32,
    pub new_articles: u32,
}

/// Domain service trait for the news feed.
#[async_trait::async_trait]
pub trait NewsService: Send + Sync {
    async fn list(&self, limit: u64) -> Result<Vec<NewsDto>, NewsError>;

    async fn list_by_district(&self, district: &str) -> Result<Vec<NewsDto>, NewsError>;

    /// Adds an editor-written article outside the feed ingestion path.
    async fn add_manual(&self, article: ManualArticle) -> Result<NewsDto, NewsError>;

    /// Polls every configured feed once; per-feed failures are counted, not
    /// fatal.
    async fn refresh(&self) -> Result<NewsRefreshStats, NewsError>;

    /// Removes articles older than the configured retention window.
    async fn prune_expired(&self) -> Result<u64, NewsError>;
}

pub struct DefaultNewsService {
    store: Store,
    feeds: Arc<FeedClient>,
    config: Arc<RwLock<Config>>,
}

impl DefaultNewsService {
    #[must_use]
    pub const fn new(store: Store, feeds: Arc<FeedClient>, config: Arc<RwLock<Config>>) -> Self {
        Self {
            store,
            feeds,
            config,
        }
    }
}

#[async_trait::async_trait]
impl NewsService for DefaultNewsService {
    async fn list(&self, limit: u64) -> Result<Vec<NewsDto>, NewsError> {
        let rows = self.store.list_articles(limit).await?;
        Ok(rows.into_iter().map(NewsDto::from).collect())
    }

    async fn list_by_district(&self, district: &str) -> Result<Vec<NewsDto>, NewsError> {
        let rows = self.store.list_articles_by_district(district).await?;
        Ok(rows.into_iter().map(NewsDto::from).collect())
    }

    async fn add_manual(&self, article: ManualArticle) -> Result<NewsDto, NewsError> {
        if article.title.trim().is_empty() {
            return Err(NewsError::Validation("Title cannot be empty".to_string()));
        }
        if article.link.trim().is_empty() {
            return Err(NewsError::Validation("Link cannot be empty".to_string()));
        }

        let row = self
            .store
            .add_article(&NewArticle {
                title: article.title.trim().to_string(),
                link: article.link.trim().to_string(),
                content: article.content,
                district: article.district,
                source: None,
                published_at: Some(chrono::Utc::now().to_rfc3339()),
            })
            .await
            .map_err(|e| NewsError::Validation(format!("Could not store article: {e}")))?;

        Ok(NewsDto::from(row))
    }

    async fn refresh(&self) -> Result<NewsRefreshStats, NewsError> {
        let feeds = self.config.read().await.news.feeds.clone();
        let mut stats = NewsRefreshStats::default();

        // Feeds are independent; fetch them concurrently and write
        // sequentially.
        let fetches = futures::future::join_all(feeds.iter().map(|feed| {
            let client = self.feeds.clone();
            async move { client.fetch(&feed.url).await }
        }))
        .await;

        for (feed, fetched) in feeds.iter().zip(fetches) {
            stats.feeds_checked += 1;

            match fetched {
                Ok((source, articles)) => {
                    for article in articles {
                        let district = article.category.or_else(|| feed.district.clone());

                        let inserted = self
                            .store
                            .insert_article_if_new(&NewArticle {
                                title: article.title,
                                link: article.link,
                                content: article.summary,
                                district,
                                source: source.clone(),
                                published_at: article.published_at,
                            })
                            .await?;

                        if inserted {
                            stats.new_articles += 1;
                        }
                    }
                }
                Err(e) => {
                    stats.feeds_failed += 1;
                    warn!("Failed to fetch news feed {}: {}", feed.url, e);
                }
            }
        }

        info!(
            "News refresh complete: {} feeds, {} new articles, {} failures",
            stats.feeds_checked, stats.new_articles, stats.feeds_failed
        );
        Ok(stats)
    }

    async fn prune_expired(&self) -> Result<u64, NewsError> {
        let max_age_days = self.config.read().await.news.max_age_days;
        let cutoff = (chrono::Utc::now() - chrono::Duration::days(max_age_days)).to_rfc3339();
        let removed = self.store.prune_articles_older_than(&cutoff).await?;
        Ok(removed)
    }
}
