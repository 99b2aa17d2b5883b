//! Adapter configuration

use crate::backend::BackendId;
use crate::providers::BackendSettings;
use crate::resilience::DEFAULT_ATTEMPT_TIMEOUT;
use crate::router::RoutingTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Everything the adapter needs besides credentials
///
/// Deserializes from a partial document; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Preferred default backend; ignored when not registered
    pub default_backend: Option<BackendId>,
    /// Per-attempt deadline in milliseconds (0 means the default)
    pub attempt_timeout_ms: u64,
    /// Preference and fallback tables
    pub routing: RoutingTable,
    /// Per-backend client overrides
    pub backends: BTreeMap<BackendId, BackendSettings>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            default_backend: None,
            attempt_timeout_ms: DEFAULT_ATTEMPT_TIMEOUT.as_millis() as u64,
            routing: RoutingTable::default(),
            backends: BTreeMap::new(),
        }
    }
}

impl AdapterConfig {
    /// Per-attempt deadline
    #[must_use]
    pub fn attempt_timeout(&self) -> Duration {
        if self.attempt_timeout_ms == 0 {
            DEFAULT_ATTEMPT_TIMEOUT
        } else {
            Duration::from_millis(self.attempt_timeout_ms)
        }
    }
}
