//! Lead repository

use crate::keys;
use crate::kv::KvStore;
use crate::models::{normalize_email, Lead};
use crate::repository::{load_collection, save_collection};
use leadflow_common::types::{LeadId, LeadStatus};
use leadflow_common::{Error, Result};
use std::sync::Arc;

/// Repository over the `leads` collection
#[derive(Clone)]
pub struct LeadRepository {
    store: Arc<dyn KvStore>,
}

impl LeadRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Read the full lead collection
    pub async fn list(&self) -> Result<Vec<Lead>> {
        load_collection(self.store.as_ref(), keys::LEADS).await
    }

    /// Persist the full lead collection
    pub async fn save_all(&self, leads: &[Lead]) -> Result<()> {
        save_collection(self.store.as_ref(), keys::LEADS, leads).await
    }

    /// Find a stored lead by its normalized email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Lead>> {
        let normalized = normalize_email(email);
        let leads = self.list().await?;
        Ok(leads.into_iter().find(|l| l.normalized_email() == normalized))
    }

    /// Update the delivery status of one lead. Only the fan-out
    /// dispatcher calls this.
    pub async fn set_status(&self, id: LeadId, status: LeadStatus) -> Result<()> {
        let mut leads = self.list().await?;

        let lead = leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| Error::NotFound(format!("lead {}", id)))?;
        lead.status = status;

        self.save_all(&leads).await
    }
}
