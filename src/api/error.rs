use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::{
    AuthError, EssentialError, HouseholdError, ItemError, MailError, MapError, NewsError,
    PreparednessError,
};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    UpstreamError { service: String, message: String },

    ValidationError(String),

    Conflict(String),

    InternalError(String),

    Unauthorized(String),

    Forbidden(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::UpstreamError { service, message } => {
                write!(f, "{} error: {}", service, message)
            }
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ApiError::UpstreamError { service, message } => {
                tracing::warn!("{} error: {}", service, message);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{} is unavailable", service),
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            AuthError::UserNotFound => ApiError::NotFound("User not found".to_string()),
            AuthError::EmailTaken | AuthError::PhoneTaken => ApiError::Conflict(err.to_string()),
            AuthError::Forbidden(msg) => ApiError::Forbidden(msg),
            AuthError::Validation(msg) => ApiError::ValidationError(msg),
            AuthError::Database(msg) => ApiError::DatabaseError(msg),
            AuthError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<HouseholdError> for ApiError {
    fn from(err: HouseholdError) -> Self {
        match err {
            HouseholdError::NotFound(id) => {
                ApiError::NotFound(format!("Household {} not found", id))
            }
            HouseholdError::UserNotFound(id) => {
                ApiError::NotFound(format!("User {} not found", id))
            }
            HouseholdError::NotAMember | HouseholdError::NotHouseholdAdmin => {
                ApiError::Forbidden(err.to_string())
            }
            HouseholdError::CodeExhausted => ApiError::InternalError(err.to_string()),
            HouseholdError::Validation(msg) => ApiError::ValidationError(msg),
            HouseholdError::Database(msg) => ApiError::DatabaseError(msg),
            HouseholdError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<ItemError> for ApiError {
    fn from(err: ItemError) -> Self {
        match err {
            ItemError::NotFound(id) => ApiError::NotFound(format!("Item {} not found", id)),
            ItemError::HouseholdNotFound(id) => {
                ApiError::NotFound(format!("Household {} not found", id))
            }
            ItemError::NotAMember(_) => ApiError::Forbidden(err.to_string()),
            ItemError::UnknownUnit(_) | ItemError::UnknownCategory(_) => {
                ApiError::ValidationError(err.to_string())
            }
            ItemError::Validation(msg) => ApiError::ValidationError(msg),
            ItemError::Database(msg) => ApiError::DatabaseError(msg),
            ItemError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<EssentialError> for ApiError {
    fn from(err: EssentialError) -> Self {
        match err {
            EssentialError::HouseholdNotFound(id) => {
                ApiError::NotFound(format!("Household {} not found", id))
            }
            EssentialError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl From<PreparednessError> for ApiError {
    fn from(err: PreparednessError) -> Self {
        match err {
            PreparednessError::HouseholdNotFound(id) => {
                ApiError::NotFound(format!("Household {} not found", id))
            }
            PreparednessError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl From<NewsError> for ApiError {
    fn from(err: NewsError) -> Self {
        match err {
            NewsError::Feed(msg) => ApiError::UpstreamError {
                service: "News feed".to_string(),
                message: msg,
            },
            NewsError::Validation(msg) => ApiError::ValidationError(msg),
            NewsError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl From<MapError> for ApiError {
    fn from(err: MapError) -> Self {
        match err {
            MapError::ZoneNotFound(id) => ApiError::NotFound(format!("Zone {} not found", id)),
            MapError::InvalidGeometry(msg) => ApiError::ValidationError(msg),
            MapError::Import(msg) => ApiError::InternalError(msg),
            MapError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        match err {
            MailError::UserNotFound(id) => ApiError::NotFound(format!("User {} not found", id)),
            MailError::InvalidToken => {
                ApiError::ValidationError("Invalid or expired token".to_string())
            }
            MailError::Validation(msg) => ApiError::ValidationError(msg),
            MailError::Transport(msg) => ApiError::UpstreamError {
                service: "Mail delivery".to_string(),
                message: msg,
            },
            MailError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }

    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        ApiError::NotFound(format!("{} {} not found", resource, id))
    }
}
