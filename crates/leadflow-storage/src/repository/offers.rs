//! Offer repository

use crate::keys;
use crate::kv::KvStore;
use crate::models::Offer;
use crate::repository::{load_collection, save_collection};
use leadflow_common::Result;
use std::sync::Arc;

/// Repository over the `offers` collection. The pipeline only reads;
/// writes come from the admin front-end (and from tests).
#[derive(Clone)]
pub struct OfferRepository {
    store: Arc<dyn KvStore>,
}

impl OfferRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Read the full offer collection in stored order
    pub async fn list(&self) -> Result<Vec<Offer>> {
        load_collection(self.store.as_ref(), keys::OFFERS).await
    }

    /// Active offers only, stored order preserved
    pub async fn list_active(&self) -> Result<Vec<Offer>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|o| o.is_active)
            .collect())
    }

    /// Look up one offer by id. Inactive offers are never returned,
    /// even when requested explicitly.
    pub async fn get_active(&self, id: &str) -> Result<Option<Offer>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|o| o.id == id && o.is_active))
    }

    /// Replace the whole collection
    pub async fn replace_all(&self, offers: &[Offer]) -> Result<()> {
        save_collection(self.store.as_ref(), keys::OFFERS, offers).await
    }
}
