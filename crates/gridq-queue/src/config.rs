//! Queue engine configuration

use gridq_store::StoreConfig;

/// Configuration for a queue engine
#[derive(Clone)]
pub struct QueueConfig {
    /// Backing store configuration
    pub store: StoreConfig,

    /// Occupied slots the offer collision walk may skip before re-fetching
    /// a fresh tentative id from the index
    pub max_offer_probes: u32,

    /// Rounds of probing (each starting from a fresh tentative id) before
    /// an offer fails with a contention error
    pub max_offer_retries: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            max_offer_probes: 64,
            max_offer_retries: 8,
        }
    }
}

impl QueueConfig {
    /// Create a config with the given backing store configuration
    pub fn new(store: StoreConfig) -> Self {
        Self {
            store,
            ..Default::default()
        }
    }

    /// Set the per-round probe budget
    pub fn with_max_offer_probes(mut self, probes: u32) -> Self {
        self.max_offer_probes = probes;
        self
    }

    /// Set the number of probe rounds
    pub fn with_max_offer_retries(mut self, retries: u32) -> Self {
        self.max_offer_retries = retries;
        self
    }
}
