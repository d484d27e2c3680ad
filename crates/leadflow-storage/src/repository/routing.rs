//! Routing config repository

use crate::keys;
use crate::kv::KvStore;
use crate::models::RoutingConfig;
use leadflow_common::Result;
use std::sync::Arc;

/// Repository over the `routing_config` document
#[derive(Clone)]
pub struct RoutingConfigRepository {
    store: Arc<dyn KvStore>,
}

impl RoutingConfigRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Read the routing config. An absent document yields the defaults
    /// (`single` rule, `/` fallback URL).
    pub async fn get(&self) -> Result<RoutingConfig> {
        match self.store.get(keys::ROUTING_CONFIG).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(RoutingConfig::default()),
        }
    }

    /// Replace the routing config
    pub async fn set(&self, config: &RoutingConfig) -> Result<()> {
        let raw = serde_json::to_string(config)?;
        self.store.set(keys::ROUTING_CONFIG, &raw).await
    }
}
