//! Integration repository

use crate::keys;
use crate::kv::KvStore;
use crate::models::Integration;
use crate::repository::{load_collection, save_collection};
use leadflow_common::Result;
use std::sync::Arc;

/// Repository over the `integrations` collection. The dispatcher only
/// reads active subscriptions; the admin front-end manages the rest.
#[derive(Clone)]
pub struct IntegrationRepository {
    store: Arc<dyn KvStore>,
}

impl IntegrationRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Read the full integration collection
    pub async fn list(&self) -> Result<Vec<Integration>> {
        load_collection(self.store.as_ref(), keys::INTEGRATIONS).await
    }

    /// Active integrations subscribed to the given event
    pub async fn list_active(&self, event: &str) -> Result<Vec<Integration>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|i| i.is_active && i.event_trigger == event)
            .collect())
    }

    /// Replace the whole collection
    pub async fn replace_all(&self, integrations: &[Integration]) -> Result<()> {
        save_collection(self.store.as_ref(), keys::INTEGRATIONS, integrations).await
    }
}
