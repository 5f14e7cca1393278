use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiError, ApiResponse, AppState};
use crate::services::{LoginResult, RegisterInput, UserInfo};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// reCAPTCHA response token from the registration form.
    #[serde(default)]
    pub captcha_token: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/users/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    let human = state
        .captcha()
        .verify(&payload.captcha_token)
        .await
        .map_err(|e| ApiError::UpstreamError {
            service: "Captcha".to_string(),
            message: e.to_string(),
        })?;

    if !human {
        return Err(ApiError::validation("Captcha verification failed"));
    }

    let result = state
        .auth_service()
        .register(RegisterInput {
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
            phone: payload.phone,
            latitude: payload.latitude,
            longitude: payload.longitude,
        })
        .await?;

    Ok(Json(ApiResponse::success(result)))
}

/// POST /api/users/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .auth_service()
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(result)))
}

/// GET /api/users/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let info = state.auth_service().get_user_info(user.id).await?;
    Ok(Json(ApiResponse::success(info)))
}
