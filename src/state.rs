use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clients::captcha::CaptchaClient;
use crate::clients::feed::FeedClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, DefaultNewsService, EssentialItemService, HouseholdService, ItemService,
    MailService, MapService, NewsService, PreparednessService, SeaOrmAuthService,
    SeaOrmHouseholdService, SeaOrmItemService, TokenIssuer,
};

/// Build a shared HTTP client with reasonable defaults for outbound calls
/// (news feeds, captcha verification). Reusing one client enables
/// connection pooling and avoids socket exhaustion.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("Beredt/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub tokens: Arc<TokenIssuer>,

    pub captcha: Arc<CaptchaClient>,

    pub auth_service: Arc<dyn AuthService>,

    pub household_service: Arc<dyn HouseholdService>,

    pub item_service: Arc<dyn ItemService>,

    pub news_service: Arc<dyn NewsService>,

    pub essential_service: Arc<EssentialItemService>,

    pub preparedness_service: Arc<PreparednessService>,

    pub map_service: Arc<MapService>,

    pub mail_service: Arc<MailService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client = build_shared_http_client(config.news.request_timeout_seconds)?;

        let tokens = Arc::new(TokenIssuer::new(
            &config.auth.jwt_secret,
            config.auth.token_ttl_hours,
        ));

        let captcha = Arc::new(CaptchaClient::new(
            http_client.clone(),
            config.captcha.clone(),
        ));

        let mail_service = Arc::new(MailService::new(
            store.clone(),
            config.mail.clone(),
            config.security.clone(),
        ));

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            tokens.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService + Send + Sync + 'static>;

        let household_service = Arc::new(SeaOrmHouseholdService::new(store.clone()))
            as Arc<dyn HouseholdService + Send + Sync + 'static>;

        let item_service = Arc::new(SeaOrmItemService::new(store.clone()))
            as Arc<dyn ItemService + Send + Sync + 'static>;

        let essential_service = Arc::new(EssentialItemService::new(store.clone()));
        let preparedness_service = Arc::new(PreparednessService::new(store.clone()));
        let map_service = Arc::new(MapService::new(store.clone()));

        let config_arc = Arc::new(RwLock::new(config));

        let news_service = Arc::new(DefaultNewsService::new(
            store.clone(),
            Arc::new(FeedClient::new(http_client)),
            config_arc.clone(),
        )) as Arc<dyn NewsService + Send + Sync + 'static>;

        Ok(Self {
            config: config_arc,
            store,
            tokens,
            captcha,
            auth_service,
            household_service,
            item_service,
            news_service,
            essential_service,
            preparedness_service,
            map_service,
            mail_service,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
