//! Redirect Orchestrator
//!
//! Resolves the destination for a lead and writes the audit record.
//! Total over any reachable configuration state: a missing offer, a
//! missing config document, or a storage failure all resolve to some
//! URL, never an error to the caller.

use crate::offers::OfferEngine;
use chrono::Utc;
use leadflow_common::types::DEFAULT_FALLBACK_OFFER_ID;
use leadflow_storage::models::{AnalyticsLogEntry, Lead, RoutingConfig};
use leadflow_storage::repository::{AnalyticsRepository, OfferRepository, RoutingConfigRepository};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Placeholder substituted with the percent-encoded lead email
const SUBID_PLACEHOLDER: &str = "{subid}";

pub struct RedirectOrchestrator {
    offers: OfferRepository,
    routing: RoutingConfigRepository,
    analytics: AnalyticsRepository,
    engine: OfferEngine,
}

impl RedirectOrchestrator {
    pub fn new(
        offers: OfferRepository,
        routing: RoutingConfigRepository,
        analytics: AnalyticsRepository,
    ) -> Self {
        Self {
            offers,
            routing,
            analytics,
            engine: OfferEngine::new(),
        }
    }

    /// Resolve the redirect target for a lead and log the decision
    pub async fn redirect(&self, lead: &Lead) -> String {
        let offers = match self.offers.list().await {
            Ok(offers) => offers,
            Err(e) => {
                warn!("Failed to load offers, using default URL: {}", e);
                Vec::new()
            }
        };
        let config = match self.routing.get().await {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load routing config, using defaults: {}", e);
                RoutingConfig::default()
            }
        };

        let selected = self.engine.select(&offers, &config);

        let (target_url, offer_id) = match selected {
            Some(offer) => (offer.url.clone(), offer.id.clone()),
            None => (
                config.default_url.clone(),
                DEFAULT_FALLBACK_OFFER_ID.to_string(),
            ),
        };

        let target_url = substitute_subid(&target_url, &lead.email);

        let entry = AnalyticsLogEntry {
            id: Uuid::new_v4(),
            email: lead.email.clone(),
            offer_id: offer_id.clone(),
            timestamp: Utc::now(),
            device: lead.device,
        };
        if let Err(e) = self.analytics.append(entry).await {
            error!("Failed to append analytics log entry: {}", e);
        }

        info!(offer_id = %offer_id, device = %lead.device, "Resolved redirect");

        target_url
    }
}

/// Replace the `{subid}` placeholder with the percent-encoded email
fn substitute_subid(url: &str, email: &str) -> String {
    if url.contains(SUBID_PLACEHOLDER) {
        url.replace(SUBID_PLACEHOLDER, &urlencoding::encode(email))
    } else {
        url.to_string()
    }
}
