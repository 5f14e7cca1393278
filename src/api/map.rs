use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::services::{PolygonGeometry, ShelterDto, ZoneDto, ZoneNode, ZoneWrite};

#[derive(Debug, Deserialize)]
pub struct ZoneRequest {
    pub name: String,
    pub zone_type: String,
    pub severity_level: i32,
    pub description: Option<String>,
    pub geometry: PolygonGeometry,
}

impl From<ZoneRequest> for ZoneWrite {
    fn from(payload: ZoneRequest) -> Self {
        Self {
            name: payload.name,
            zone_type: payload.zone_type,
            severity_level: payload.severity_level,
            description: payload.description,
            geometry: payload.geometry,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImportResult {
    pub imported: usize,
}

/// GET /api/emergency-zones
pub async fn list_zones(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ZoneDto>>>, ApiError> {
    let zones = state.map_service().list_zones().await?;
    Ok(Json(ApiResponse::success(zones)))
}

/// GET /api/emergency-zones/{id}
pub async fn get_zone(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ZoneDto>>, ApiError> {
    let id = validate_id(id)?;
    let zone = state.map_service().get_zone(id).await?;
    Ok(Json(ApiResponse::success(zone)))
}

/// POST /api/emergency-zones
pub async fn create_zone(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ZoneRequest>,
) -> Result<Json<ApiResponse<ZoneDto>>, ApiError> {
    let zone = state.map_service().create_zone(&payload.into()).await?;
    Ok(Json(ApiResponse::success(zone)))
}

/// PUT /api/emergency-zones/{id}
pub async fn update_zone(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<ZoneRequest>,
) -> Result<Json<ApiResponse<ZoneDto>>, ApiError> {
    let id = validate_id(id)?;
    let zone = state.map_service().update_zone(id, &payload.into()).await?;
    Ok(Json(ApiResponse::success(zone)))
}

/// DELETE /api/emergency-zones/{id}
pub async fn delete_zone(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id)?;
    state.map_service().delete_zone(id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Zone deleted",
    ))))
}

/// GET /api/map/zones — zones nested by containment for the map view.
pub async fn zones_nested(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ZoneNode>>>, ApiError> {
    let nodes = state.map_service().zones_nested().await?;
    Ok(Json(ApiResponse::success(nodes)))
}

/// GET /api/map/shelters
pub async fn list_shelters(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ShelterDto>>>, ApiError> {
    let shelters = state.map_service().list_shelters().await?;
    Ok(Json(ApiResponse::success(shelters)))
}

/// POST /api/bunker/import — one-shot ingestion of the bundled dataset.
pub async fn import_shelters(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ImportResult>>, ApiError> {
    let imported = state.map_service().import_shelters().await?;
    Ok(Json(ApiResponse::success(ImportResult { imported })))
}
