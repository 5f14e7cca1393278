use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, MessageResponse};

#[derive(Debug, Deserialize)]
pub struct TestMailRequest {
    pub to: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub token: String,
    /// Required for password-reset tokens.
    pub new_password: Option<String>,
}

/// POST /api/email/verify/{user_id}
pub async fn send_verification(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let user_id = validate_id(user_id)?;
    state.mail_service().send_verification(user_id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Verification email sent",
    ))))
}

/// POST /api/email/reset-password/{user_id}
pub async fn send_password_reset(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let user_id = validate_id(user_id)?;
    state.mail_service().send_password_reset(user_id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password reset email sent",
    ))))
}

/// POST /api/email/test
pub async fn send_test(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TestMailRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.to.trim().is_empty() {
        return Err(ApiError::validation("Recipient is required"));
    }

    state.mail_service().send_test(payload.to.trim()).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Test email sent",
    ))))
}

/// POST /api/email/confirm — completes a verification or reset flow.
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .mail_service()
        .confirm(&payload.token, payload.new_password.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Confirmed",
    ))))
}
