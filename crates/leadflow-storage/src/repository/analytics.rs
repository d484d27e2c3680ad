//! Analytics log repository

use crate::keys;
use crate::kv::KvStore;
use crate::models::AnalyticsLogEntry;
use crate::repository::{load_collection, save_collection};
use leadflow_common::Result;
use std::sync::Arc;

/// Repository over the append-only `analytics_log` collection. Entries
/// are never mutated or deleted here; retention is an external concern.
#[derive(Clone)]
pub struct AnalyticsRepository {
    store: Arc<dyn KvStore>,
}

impl AnalyticsRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Read the full log
    pub async fn list(&self) -> Result<Vec<AnalyticsLogEntry>> {
        load_collection(self.store.as_ref(), keys::ANALYTICS_LOG).await
    }

    /// Append one entry and persist
    pub async fn append(&self, entry: AnalyticsLogEntry) -> Result<()> {
        let mut entries = self.list().await?;
        entries.push(entry);
        save_collection(self.store.as_ref(), keys::ANALYTICS_LOG, &entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;
    use chrono::Utc;
    use leadflow_common::types::DeviceClass;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_append_preserves_existing_entries() {
        let repo = AnalyticsRepository::new(Arc::new(MemoryKvStore::new()));

        for offer_id in ["offer_a", "offer_b"] {
            repo.append(AnalyticsLogEntry {
                id: Uuid::new_v4(),
                email: "a@x.com".to_string(),
                offer_id: offer_id.to_string(),
                timestamp: Utc::now(),
                device: DeviceClass::Desktop,
            })
            .await
            .unwrap();
        }

        let entries = repo.list().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].offer_id, "offer_a");
        assert_eq!(entries[1].offer_id, "offer_b");
    }
}
