//! API routes

use axum::{
    routing::{get, post},
    Router,
};
use leadflow_core::{
    ContentGenerator, FanoutDispatcher, LeadIntake, RedirectOrchestrator,
};
use leadflow_storage::repository::{LeadRepository, OfferRepository};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared application state
pub struct AppState {
    pub intake: Arc<LeadIntake>,
    pub dispatcher: Arc<FanoutDispatcher>,
    pub orchestrator: Arc<RedirectOrchestrator>,
    pub leads: LeadRepository,
    pub offers: OfferRepository,
    pub generator: Arc<dyn ContentGenerator>,
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/leads", post(handlers::capture_lead))
        .route("/redirect", get(handlers::redirect))
        .route("/offers/wall", get(handlers::offer_wall))
        .route("/content", post(handlers::generate_content));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
