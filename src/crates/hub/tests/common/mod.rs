//! Shared fixtures for the hub integration tests.

#![allow(dead_code)]

use adapters::{AdapterError, AdapterSet, MockAdapter, ServiceAdapter, ServiceFamily};
use async_trait::async_trait;
use hub::{EngineConfig, Hub, InMemoryRepository, OwnerProfile};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Mock adapter that fails the actions it is told to and records every call.
pub struct ScriptedAdapter {
    inner: MockAdapter,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedAdapter {
    pub fn new(family: ServiceFamily) -> Self {
        Self {
            inner: MockAdapter::new(family),
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, action: &str) -> Self {
        self.failing.insert(action.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ServiceAdapter for ScriptedAdapter {
    fn family(&self) -> ServiceFamily {
        self.inner.family()
    }

    async fn invoke(&self, action: &str, parameters: &Value) -> adapters::Result<Value> {
        self.calls.lock().push(action.to_string());
        if self.failing.contains(action) {
            return Err(AdapterError::Provider(format!("{} rejected by vendor", action)));
        }
        self.inner.invoke(action, parameters).await
    }
}

/// Hub over in-memory storage with the given adapters.
pub fn hub_with(adapters: AdapterSet) -> Hub {
    Hub::with_components(
        Arc::new(InMemoryRepository::new()),
        adapters,
        EngineConfig::default(),
    )
    .expect("hub assembles")
}

/// Hub over in-memory storage with every family mocked.
pub fn mocked_hub() -> Hub {
    hub_with(AdapterSet::mocked())
}

pub fn owner() -> OwnerProfile {
    OwnerProfile::new("user-1")
}
