//! Leadflow - API server entry point

use anyhow::Result;
use leadflow_common::config::Config;
use leadflow_core::{
    FanoutDispatcher, HttpContentGenerator, LeadIntake, RedirectOrchestrator, SmtpRotationPool,
};
use leadflow_storage::kv::create_store;
use leadflow_server::{routes, AppState};
use leadflow_storage::repository::{
    AnalyticsRepository, IntegrationRepository, LeadRepository, OfferRepository,
    RoutingConfigRepository, SmtpProfileRepository,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so logging can use its filter
    let config = Config::load()?;

    init_logging(&config.logging.filter);

    info!("Starting Leadflow server...");

    // Initialize the key-value store and repositories
    let store = create_store(&config.storage)?;
    let leads = LeadRepository::new(store.clone());
    let offers = OfferRepository::new(store.clone());
    let routing = RoutingConfigRepository::new(store.clone());
    let profiles = SmtpProfileRepository::new(store.clone());
    let integrations = IntegrationRepository::new(store.clone());
    let analytics = AnalyticsRepository::new(store.clone());

    // Pipeline services
    let intake = Arc::new(LeadIntake::new(leads.clone()));
    let pool = Arc::new(SmtpRotationPool::new(profiles));
    let dispatcher = FanoutDispatcher::new(
        integrations,
        leads.clone(),
        pool,
        &config.dispatch,
    );
    let orchestrator = Arc::new(RedirectOrchestrator::new(
        offers.clone(),
        routing,
        analytics,
    ));
    let generator = Arc::new(HttpContentGenerator::new(&config.content));

    let state = Arc::new(AppState {
        intake,
        dispatcher,
        orchestrator,
        leads,
        offers,
        generator,
    });

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("Listening on {}", config.server.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Leadflow server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    } else {
        info!("Shutdown signal received");
    }
}

fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_level(true))
        .with(filter)
        .init();
}
