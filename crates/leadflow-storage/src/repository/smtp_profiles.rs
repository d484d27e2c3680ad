//! SMTP profile repository

use crate::keys;
use crate::kv::KvStore;
use crate::models::SmtpProfile;
use crate::repository::{load_collection, save_collection};
use leadflow_common::Result;
use std::sync::Arc;

/// Repository over the `smtp_profiles` collection. `currentUsage` and
/// `lastResetDate` are mutated only through the rotation pool.
#[derive(Clone)]
pub struct SmtpProfileRepository {
    store: Arc<dyn KvStore>,
}

impl SmtpProfileRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Read the full profile collection in stored order
    pub async fn list(&self) -> Result<Vec<SmtpProfile>> {
        load_collection(self.store.as_ref(), keys::SMTP_PROFILES).await
    }

    /// Persist the full profile collection
    pub async fn save_all(&self, profiles: &[SmtpProfile]) -> Result<()> {
        save_collection(self.store.as_ref(), keys::SMTP_PROFILES, profiles).await
    }
}
