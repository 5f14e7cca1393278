use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::{validate_coordinate, validate_id};
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::services::{
    EssentialStatus, HouseholdDto, JoinCodeDto, MemberDto, PreparednessReport,
};

#[derive(Debug, Deserialize)]
pub struct CreateHouseholdRequest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub code: String,
}

/// GET /api/households
pub async fn list_mine(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<HouseholdDto>>>, ApiError> {
    let households = state.household_service().list_for_user(user.id).await?;
    Ok(Json(ApiResponse::success(households)))
}

/// POST /api/households
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateHouseholdRequest>,
) -> Result<Json<ApiResponse<HouseholdDto>>, ApiError> {
    validate_coordinate(payload.latitude, payload.longitude)?;

    let household = state
        .household_service()
        .create(user.id, &payload.name, payload.latitude, payload.longitude)
        .await?;

    Ok(Json(ApiResponse::success(household)))
}

/// GET /api/households/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<HouseholdDto>>, ApiError> {
    let id = validate_id(id)?;
    let household = state.household_service().get(user.id, id).await?;
    Ok(Json(ApiResponse::success(household)))
}

/// DELETE /api/households/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id)?;
    state.household_service().delete(user.id, id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Household deleted",
    ))))
}

/// GET /api/households/{id}/members
pub async fn members(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<MemberDto>>>, ApiError> {
    let id = validate_id(id)?;
    let members = state.household_service().members(user.id, id).await?;
    Ok(Json(ApiResponse::success(members)))
}

/// POST /api/households/{id}/join-code
pub async fn generate_join_code(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<JoinCodeDto>>, ApiError> {
    let id = validate_id(id)?;
    let code = state
        .household_service()
        .generate_join_code(user.id, id)
        .await?;
    Ok(Json(ApiResponse::success(code)))
}

/// POST /api/households/join
///
/// An unknown or expired code is answered with success=false rather than an
/// HTTP error; the client treats it as "invalid code".
pub async fn join(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<JoinRequest>,
) -> Result<Json<ApiResponse<HouseholdDto>>, ApiError> {
    let joined = state.household_service().join(user.id, &payload.code).await?;

    match joined {
        Some(household) => Ok(Json(ApiResponse::success(household))),
        None => Ok(Json(ApiResponse::error("Invalid or expired join code"))),
    }
}

/// DELETE /api/households/{id}/members/{user_id}
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path((id, member_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id)?;
    let member_id = validate_id(member_id)?;

    state
        .household_service()
        .remove_member(user.id, id, member_id)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Member removed",
    ))))
}

/// PUT /api/households/{id}/primary
pub async fn set_primary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id)?;
    state.household_service().set_primary(user.id, id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Primary household updated",
    ))))
}

/// GET /api/households/{id}/preparedness
pub async fn preparedness(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<PreparednessReport>>, ApiError> {
    let id = validate_id(id)?;

    // Preparedness data is member-only, like the rest of the household.
    state.household_service().get(user.id, id).await?;

    let report = state.preparedness_service().assess_household(id).await?;
    Ok(Json(ApiResponse::success(report)))
}

/// GET /api/households/{id}/essentials
pub async fn essentials(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<EssentialStatus>>>, ApiError> {
    let id = validate_id(id)?;

    state.household_service().get(user.id, id).await?;

    let statuses = state.essential_service().status_for_household(id).await?;
    Ok(Json(ApiResponse::success(statuses)))
}
