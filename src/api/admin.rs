use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::services::{LoginResult, RegisterInput, UserInfo};

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// POST /api/admin/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let result = state
        .auth_service()
        .admin_login(&payload.email, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(result)))
}

/// POST /api/admin/create
pub async fn create_admin(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateAdminRequest>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let created = state
        .auth_service()
        .create_admin(
            user.role,
            RegisterInput {
                email: payload.email,
                password: payload.password,
                first_name: payload.first_name,
                last_name: payload.last_name,
                phone: payload.phone,
                latitude: None,
                longitude: None,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(created)))
}

/// POST /api/admin/elevate/{id}
pub async fn elevate(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let id = validate_id(id)?;
    let elevated = state.auth_service().elevate_admin(user.role, id).await?;
    Ok(Json(ApiResponse::success(elevated)))
}

/// POST /api/admin/delete/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id)?;
    state
        .auth_service()
        .delete_admin(user.role, user.id, id)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Account deleted",
    ))))
}

/// GET /api/admin
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserInfo>>>, ApiError> {
    let admins = state.auth_service().list_admins().await?;
    Ok(Json(ApiResponse::success(admins)))
}
