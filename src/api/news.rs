use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_district, validate_limit};
use super::{ApiError, ApiResponse, AppState};
use crate::services::{ManualArticle, NewsDto, NewsRefreshStats};

#[derive(Debug, Deserialize)]
pub struct ListNewsQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_limit() -> u64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct AddNewsRequest {
    pub title: String,
    pub link: String,
    pub content: String,
    pub district: Option<String>,
}

/// GET /api/news
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListNewsQuery>,
) -> Result<Json<ApiResponse<Vec<NewsDto>>>, ApiError> {
    let limit = validate_limit(query.limit)?;
    let articles = state.news_service().list(limit).await?;
    Ok(Json(ApiResponse::success(articles)))
}

/// GET /api/news/district/{district}
pub async fn by_district(
    State(state): State<Arc<AppState>>,
    Path(district): Path<String>,
) -> Result<Json<ApiResponse<Vec<NewsDto>>>, ApiError> {
    let district = validate_district(&district)?;
    let articles = state.news_service().list_by_district(district).await?;
    Ok(Json(ApiResponse::success(articles)))
}

/// POST /api/news/add
pub async fn add(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AddNewsRequest>,
) -> Result<Json<ApiResponse<NewsDto>>, ApiError> {
    let article = state
        .news_service()
        .add_manual(ManualArticle {
            title: payload.title,
            link: payload.link,
            content: payload.content,
            district: payload.district,
        })
        .await?;
    Ok(Json(ApiResponse::success(article)))
}

/// POST /api/news/retrieve — one-shot ingestion outside the scheduler.
pub async fn retrieve(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<NewsRefreshStats>>, ApiError> {
    let stats = state.news_service().refresh().await?;
    Ok(Json(ApiResponse::success(stats)))
}
