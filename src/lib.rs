pub mod api;
pub mod clients;
pub mod config;
pub mod constants;
pub mod db;
pub mod domain;
pub mod entities;
pub mod geo;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
use clap::{Parser, Subcommand};
pub use config::Config;
use services::Scheduler;
use state::SharedState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "beredt")]
#[command(author, version, about = "Household emergency-preparedness backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server and background scheduler
    Serve,

    /// Create a default config file
    Init,

    /// Poll the configured news feeds once and exit
    RefreshNews,

    /// Import the bundled public-shelter dataset and exit
    ImportShelters,

    /// Create a superadmin account
    CreateAdmin {
        email: String,
        password: String,
    },
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "beredt")?
            .extra_field("env", "production")?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Serve) => run_daemon(config, prometheus_handle).await,

        Some(Commands::Init) => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("config.toml already exists.");
            }
            Ok(())
        }

        Some(Commands::RefreshNews) => {
            let shared = Arc::new(SharedState::new(config).await?);
            let stats = shared
                .news_service
                .refresh()
                .await
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            println!(
                "Checked {} feeds: {} new articles, {} failures",
                stats.feeds_checked, stats.new_articles, stats.feeds_failed
            );
            Ok(())
        }

        Some(Commands::ImportShelters) => {
            let shared = Arc::new(SharedState::new(config).await?);
            let imported = shared
                .map_service
                .import_shelters()
                .await
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("✓ Imported {imported} shelters");
            Ok(())
        }

        Some(Commands::CreateAdmin { email, password }) => {
            create_superadmin(config, &email, &password).await
        }
    }
}

async fn create_superadmin(config: Config, email: &str, password: &str) -> anyhow::Result<()> {
    use crate::db::NewUser;
    use crate::domain::Role;

    let shared = SharedState::new(config.clone()).await?;

    if shared.store.email_in_use(email).await? {
        anyhow::bail!("Email {email} is already in use");
    }

    let user = shared
        .store
        .create_user(
            NewUser {
                email: email.to_string(),
                password: password.to_string(),
                first_name: "Super".to_string(),
                last_name: "Admin".to_string(),
                phone: format!("+47{}", chrono::Utc::now().timestamp_subsec_micros()),
                latitude: None,
                longitude: None,
                role: Role::Superadmin,
            },
            &config.security,
        )
        .await?;

    println!("✓ Created superadmin {} (id {})", user.email, user.id);
    Ok(())
}

async fn run_daemon(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "Beredt v{} starting in server mode...",
        env!("CARGO_PKG_VERSION")
    );

    let shared = Arc::new(SharedState::new(config.clone()).await?);
    let api_state = api::create_app_state(shared.clone(), prometheus_handle).await;

    let scheduler = Scheduler::new(shared.clone(), config.scheduler.clone());

    let scheduler_handle = tokio::spawn(async move {
        if let Err(e) = scheduler.start().await {
            error!("Scheduler error: {}", e);
        }
    });

    let server_handle: Option<tokio::task::JoinHandle<()>> = if config.server.enabled {
        let port = config.server.port;
        info!("Starting Web API on port {}", port);

        let app = api::router(api_state).await;
        let addr = format!("0.0.0.0:{}", port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        Some(tokio::spawn(async move {
            info!("Web server running at http://0.0.0.0:{}", port);
            if let Err(e) = axum::serve(listener, app).await {
                error!("Web server error: {}", e);
            }
        }))
    } else {
        None
    };

    info!("Server running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    scheduler_handle.abort();
    if let Some(handle) = server_handle {
        handle.abort();
    }
    info!("Server stopped");

    Ok(())
}
