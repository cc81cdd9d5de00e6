//! Configuration-driven adapter selection.

use crate::config::AdaptersConfig;
use crate::error::Result;
use crate::live::HttpServiceAdapter;
use crate::mock::MockAdapter;
use crate::{ServiceAdapter, ServiceFamily};
use std::collections::HashMap;
use std::sync::Arc;

/// One adapter per service family, chosen once at composition time.
#[derive(Clone, Default)]
pub struct AdapterSet {
    adapters: HashMap<ServiceFamily, Arc<dyn ServiceAdapter>>,
}

impl AdapterSet {
    /// Empty set, for tests that install their own adapters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every family mocked.
    pub fn mocked() -> Self {
        ServiceFamily::ALL
            .into_iter()
            .fold(Self::new(), |set, family| {
                set.with_adapter(Arc::new(MockAdapter::new(family)))
            })
    }

    /// Live adapter for every family with an API key, mock for the rest.
    pub fn from_config(config: &AdaptersConfig) -> Result<Self> {
        let mut set = Self::new();

        for family in ServiceFamily::ALL {
            let endpoint = config.endpoint(family);
            let adapter: Arc<dyn ServiceAdapter> = if endpoint.is_live() {
                tracing::info!(family = %family, "Using live adapter");
                Arc::new(HttpServiceAdapter::new(family, endpoint.clone())?)
            } else {
                tracing::info!(family = %family, "No credentials configured, using mock adapter");
                Arc::new(MockAdapter::new(family))
            };
            set.adapters.insert(family, adapter);
        }

        Ok(set)
    }

    /// Install (or replace) the adapter for its family.
    pub fn with_adapter(mut self, adapter: Arc<dyn ServiceAdapter>) -> Self {
        self.adapters.insert(adapter.family(), adapter);
        self
    }

    pub fn get(&self, family: ServiceFamily) -> Option<Arc<dyn ServiceAdapter>> {
        self.adapters.get(&family).cloned()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for AdapterSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut families: Vec<_> = self.adapters.keys().map(|f| f.as_str()).collect();
        families.sort_unstable();
        f.debug_struct("AdapterSet").field("families", &families).finish()
    }
}
