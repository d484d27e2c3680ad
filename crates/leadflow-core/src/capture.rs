//! Lead Intake - deduplicating capture
//!
//! Capture is total from the caller's point of view: it always hands back
//! a Lead, absorbing storage failures into log lines so the user-visible
//! flow is never blocked on persistence.

use leadflow_common::types::{Attribution, LeadSource};
use leadflow_storage::models::{normalize_email, Lead};
use leadflow_storage::repository::LeadRepository;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// One capture event
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    pub email: String,
    pub source: LeadSource,
    pub attribution: Attribution,
    pub quiz_data: Option<HashMap<String, String>>,
}

/// Deduplicating lead store.
///
/// The read-check-append cycle runs under one mutex, closing the
/// concurrent-capture race the whole-document storage contract leaves
/// open.
pub struct LeadIntake {
    leads: LeadRepository,
    write_lock: Mutex<()>,
}

impl LeadIntake {
    pub fn new(leads: LeadRepository) -> Self {
        Self {
            leads,
            write_lock: Mutex::new(()),
        }
    }

    /// Capture a lead. First writer wins per normalized email: a repeat
    /// capture returns a fresh Lead carrying the new call's fields for
    /// immediate downstream use but leaves the stored record untouched.
    pub async fn capture(&self, request: CaptureRequest) -> Lead {
        let normalized = normalize_email(&request.email);
        let lead = Lead::new(
            request.email.clone(),
            request.source,
            request.attribution,
            request.quiz_data,
        );

        let _guard = self.write_lock.lock().await;

        let existing = match self.leads.list().await {
            Ok(leads) => leads,
            Err(e) => {
                // Degrade to an empty view: the caller still gets a lead,
                // the store keeps whatever it had.
                error!("Failed to read lead collection: {}", e);
                return lead;
            }
        };

        if existing.iter().any(|l| l.normalized_email() == normalized) {
            debug!(email = %normalized, "Duplicate capture absorbed, stored lead preserved");
            return lead;
        }

        let mut leads = existing;
        leads.push(lead.clone());

        if let Err(e) = self.leads.save_all(&leads).await {
            error!("Failed to persist lead collection: {}", e);
        } else {
            info!(lead_id = %lead.id, source = %lead.source, "Captured new lead");
        }

        lead
    }
}
