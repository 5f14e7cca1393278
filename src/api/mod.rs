use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

mod admin;
pub mod auth;
mod catalog;
mod email;
mod error;
mod households;
mod items;
mod map;
mod news;
mod observability;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn tokens(&self) -> &Arc<crate::services::TokenIssuer> {
        &self.shared.tokens
    }

    #[must_use]
    pub fn captcha(&self) -> &Arc<crate::clients::captcha::CaptchaClient> {
        &self.shared.captcha
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn crate::services::AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn household_service(&self) -> &Arc<dyn crate::services::HouseholdService> {
        &self.shared.household_service
    }

    #[must_use]
    pub fn item_service(&self) -> &Arc<dyn crate::services::ItemService> {
        &self.shared.item_service
    }

    #[must_use]
    pub fn news_service(&self) -> &Arc<dyn crate::services::NewsService> {
        &self.shared.news_service
    }

    #[must_use]
    pub fn essential_service(&self) -> &Arc<crate::services::EssentialItemService> {
        &self.shared.essential_service
    }

    #[must_use]
    pub fn preparedness_service(&self) -> &Arc<crate::services::PreparednessService> {
        &self.shared.preparedness_service
    }

    #[must_use]
    pub fn map_service(&self) -> &Arc<crate::services::MapService> {
        &self.shared.map_service
    }

    #[must_use]
    pub fn mail_service(&self) -> &Arc<crate::services::MailService> {
        &self.shared.mail_service
    }
}

pub async fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle).await)
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = {
        let config = state.config().read().await;
        config.server.cors_allowed_origins.clone()
    };

    let api_router = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .merge(admin_routes(state.clone()))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::track_metrics))
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/admin/login", post(admin::login))
        .route("/email/verify/{user_id}", post(email::send_verification))
        .route(
            "/email/reset-password/{user_id}",
            post(email::send_password_reset),
        )
        .route("/email/confirm", post(email::confirm))
        .route("/news", get(news::list))
        .route("/news/district/{district}", get(news::by_district))
        .route("/categories", get(catalog::list_categories))
        .route("/categories/{id}", get(catalog::get_category))
        .route("/units", get(catalog::list_units))
        .route("/units/{id}", get(catalog::get_unit))
        .route("/emergency-zones", get(map::list_zones))
        .route("/emergency-zones/{id}", get(map::get_zone))
        .route("/map/zones", get(map::zones_nested))
        .route("/map/shelters", get(map::list_shelters))
}

fn protected_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/me", get(users::me))
        .route("/households", get(households::list_mine))
        .route("/households", post(households::create))
        .route("/households/join", post(households::join))
        .route("/households/{id}", get(households::get))
        .route("/households/{id}", delete(households::delete))
        .route("/households/{id}/members", get(households::members))
        .route(
            "/households/{id}/members/{user_id}",
            delete(households::remove_member),
        )
        .route(
            "/households/{id}/join-code",
            post(households::generate_join_code),
        )
        .route("/households/{id}/primary", put(households::set_primary))
        .route(
            "/households/{id}/preparedness",
            get(households::preparedness),
        )
        .route("/households/{id}/essentials", get(households::essentials))
        .route("/emergency/items", get(items::list))
        .route("/emergency/items", post(items::create))
        .route("/emergency/items/{id}", get(items::get))
        .route("/emergency/items/{id}", put(items::update))
        .route("/emergency/items/{id}", delete(items::delete))
        .route("/system/status", get(system_status))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::require_auth))
}

fn admin_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin", get(admin::list))
        .route("/admin/create", post(admin::create_admin))
        .route("/admin/elevate/{id}", post(admin::elevate))
        .route("/admin/delete/{id}", post(admin::delete))
        .route("/news/add", post(news::add))
        .route("/news/retrieve", post(news::retrieve))
        .route("/emergency-zones", post(map::create_zone))
        .route("/emergency-zones/{id}", put(map::update_zone))
        .route("/emergency-zones/{id}", delete(map::delete_zone))
        .route("/bunker/import", post(map::import_shelters))
        .route("/email/test", post(email::send_test))
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn_with_state(state, auth::require_auth))
}

/// GET /api/system/status
async fn system_status(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> Result<axum::Json<ApiResponse<SystemStatus>>, ApiError> {
    let database_ok = state.store().ping().await.is_ok();

    Ok(axum::Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        database_ok,
    })))
}
