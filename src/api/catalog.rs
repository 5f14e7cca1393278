use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use std::sync::Arc;

use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState};
use crate::entities::{categories, units};

#[derive(Debug, Serialize)]
pub struct CategoryDto {
    pub id: i32,
    pub name_no: String,
    pub name_en: String,
    pub kcal_per_unit: Option<f64>,
    pub is_essential: bool,
}

impl From<categories::Model> for CategoryDto {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name_no: model.name_no,
            name_en: model.name_en,
            kcal_per_unit: model.kcal_per_unit,
            is_essential: model.is_essential,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnitDto {
    pub id: i32,
    pub name_no: String,
    pub name_en: String,
}

impl From<units::Model> for UnitDto {
    fn from(model: units::Model) -> Self {
        Self {
            id: model.id,
            name_no: model.name_no,
            name_en: model.name_en,
        }
    }
}

/// GET /api/categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CategoryDto>>>, ApiError> {
    let rows = state.store().list_categories().await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(CategoryDto::from).collect(),
    )))
}

/// GET /api/categories/{id}
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CategoryDto>>, ApiError> {
    let id = validate_id(id)?;
    let row = state
        .store()
        .get_category(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", id))?;
    Ok(Json(ApiResponse::success(CategoryDto::from(row))))
}

/// GET /api/units
pub async fn list_units(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UnitDto>>>, ApiError> {
    let rows = state.store().list_units().await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(UnitDto::from).collect(),
    )))
}

/// GET /api/units/{id}
pub async fn get_unit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UnitDto>>, ApiError> {
    let id = validate_id(id)?;
    let row = state
        .store()
        .get_unit(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Unit", id))?;
    Ok(Json(ApiResponse::success(UnitDto::from(row))))
}
