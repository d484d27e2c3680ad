//! Repository layer for data access
//!
//! Each repository wraps one well-known document in the key-value store.
//! The external contract is whole-document: read the entire collection,
//! mutate in memory, write the entire collection back. Serial ownership
//! of read-modify-write cycles belongs to the core services, which guard
//! them with a single mutex each.

pub mod analytics;
pub mod integrations;
pub mod leads;
pub mod offers;
pub mod routing;
pub mod smtp_profiles;

pub use analytics::AnalyticsRepository;
pub use integrations::IntegrationRepository;
pub use leads::LeadRepository;
pub use offers::OfferRepository;
pub use routing::RoutingConfigRepository;
pub use smtp_profiles::SmtpProfileRepository;

use crate::kv::KvStore;
use leadflow_common::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Decode the JSON document under `key` as a collection. An absent
/// document is an empty collection, not an error.
pub(crate) async fn load_collection<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Vec<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Vec::new()),
    }
}

/// Encode and persist an entire collection under `key`
pub(crate) async fn save_collection<T: Serialize>(
    store: &dyn KvStore,
    key: &str,
    items: &[T],
) -> Result<()> {
    let raw = serde_json::to_string(items)?;
    store.set(key, &raw).await
}
