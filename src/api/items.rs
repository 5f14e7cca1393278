use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::services::{ItemDto, ItemWrite};

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    pub household_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    pub name: String,
    pub amount: f64,
    pub unit_id: i32,
    pub category_id: i32,
    pub expiration_date: Option<String>,
    pub household_ids: Vec<i32>,
}

impl From<ItemRequest> for ItemWrite {
    fn from(payload: ItemRequest) -> Self {
        Self {
            name: payload.name,
            amount: payload.amount,
            unit_id: payload.unit_id,
            category_id: payload.category_id,
            expiration_date: payload.expiration_date,
            household_ids: payload.household_ids,
        }
    }
}

/// GET /api/emergency/items?household_id=
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListItemsQuery>,
) -> Result<Json<ApiResponse<Vec<ItemDto>>>, ApiError> {
    let household_id = validate_id(query.household_id)?;
    let items = state
        .item_service()
        .list_for_household(user.id, household_id)
        .await?;
    Ok(Json(ApiResponse::success(items)))
}

/// GET /api/emergency/items/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ItemDto>>, ApiError> {
    let id = validate_id(id)?;
    let item = state.item_service().get(user.id, id).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// POST /api/emergency/items
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ItemRequest>,
) -> Result<Json<ApiResponse<ItemDto>>, ApiError> {
    let item = state.item_service().create(user.id, payload.into()).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// PUT /api/emergency/items/{id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<ItemRequest>,
) -> Result<Json<ApiResponse<ItemDto>>, ApiError> {
    let id = validate_id(id)?;
    let item = state
        .item_service()
        .update(user.id, id, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

/// DELETE /api/emergency/items/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id)?;
    state.item_service().delete(user.id, id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Item deleted",
    ))))
}
