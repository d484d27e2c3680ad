//! API request handlers

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Redirect,
    Json,
};
use leadflow_common::types::LeadSource;
use leadflow_core::attribution::extract_attribution;
use leadflow_core::{CaptureRequest, DispatchMeta, OfferEngine};
use leadflow_storage::models::{Lead, Offer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

use crate::routes::AppState;

/// Request body for capturing a lead
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureBody {
    pub email: String,
    pub source: LeadSource,
    #[serde(default)]
    pub quiz_data: Option<HashMap<String, String>>,
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Capture a lead and fire the notification fan-out.
///
/// Responds as soon as the lead exists; deliveries and the confirmation
/// send happen behind this request.
pub async fn capture_lead(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<CaptureBody>,
) -> Result<Json<Lead>, StatusCode> {
    if !body.email.contains('@') {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let user_agent = header_value(&headers, header::USER_AGENT);
    let attribution = extract_attribution(&query, user_agent.as_deref().unwrap_or(""));

    let lead = state
        .intake
        .capture(CaptureRequest {
            email: body.email,
            source: body.source,
            attribution,
            quiz_data: body.quiz_data,
        })
        .await;

    state.dispatcher.dispatch(
        lead.clone(),
        DispatchMeta {
            user_agent,
            referrer: header_value(&headers, header::REFERER),
        },
    );

    Ok(Json(lead))
}

/// Query parameters for the redirect endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RedirectQuery {
    pub email: String,
}

/// Resolve the offer destination for a visitor and send them there
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RedirectQuery>,
    headers: HeaderMap,
) -> Redirect {
    let stored = state
        .leads
        .find_by_email(&query.email)
        .await
        .unwrap_or_else(|e| {
            error!("Failed to look up lead for redirect: {}", e);
            None
        });

    // A visitor arriving without a stored lead still gets routed; the
    // decision only needs an email and a device class.
    let lead = stored.unwrap_or_else(|| {
        let user_agent = header_value(&headers, header::USER_AGENT).unwrap_or_default();
        let attribution = extract_attribution(&HashMap::new(), &user_agent);
        Lead::new(query.email.clone(), LeadSource::ManualEntry, attribution, None)
    });

    let target = state.orchestrator.redirect(&lead).await;

    Redirect::temporary(&target)
}

/// Ranked active offers for the offer-wall rule
pub async fn offer_wall(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Offer>>, StatusCode> {
    let offers = state.offers.list().await.map_err(|e| {
        error!("Failed to load offers: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let ranked: Vec<Offer> = OfferEngine::new()
        .rank(&offers)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(ranked))
}

/// Request body for content generation
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateBody {
    pub prompt: String,
    #[serde(default)]
    pub fallback: String,
}

/// Generated text response
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub text: String,
}

/// Generate promo copy, resolving to the supplied fallback when the
/// collaborator is unavailable. Never an error status.
pub async fn generate_content(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateBody>,
) -> Json<GenerateResponse> {
    let text = state
        .generator
        .generate_or(&body.prompt, &body.fallback)
        .await;

    Json(GenerateResponse { text })
}

/// Liveness probe
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
