//! In-memory fetcher for tests

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::error::LoadError;
use crate::fetch::Fetcher;

/// Serves documents from memory, counts calls per key and can hold a key's
/// fetch until a permit is added to its gate.
#[derive(Default)]
pub(crate) struct StaticFetcher {
    docs: Mutex<HashMap<String, String>>,
    calls: Mutex<HashMap<String, usize>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl StaticFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(self, key: &str, body: &str) -> Self {
        self.insert(key, body);
        self
    }

    pub(crate) fn insert(&self, key: &str, body: &str) {
        self.docs.lock().insert(key.to_string(), body.to_string());
    }

    /// Block fetches of `key` until permits are added to the returned gate
    pub(crate) fn gate(&self, key: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.lock().insert(key.to_string(), Arc::clone(&gate));
        gate
    }

    pub(crate) fn calls(&self, key: &str) -> usize {
        self.calls.lock().get(key).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    /// Yield until a fetch of `key` has started
    pub(crate) async fn wait_started(&self, key: &str) {
        while self.calls(key) == 0 {
            tokio::task::yield_now().await;
        }
    }
}

impl Fetcher for StaticFetcher {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, LoadError> {
        *self.calls.lock().entry(key.to_string()).or_insert(0) += 1;

        let gate = self.gates.lock().get(key).cloned();
        if let Some(gate) = gate {
            gate.acquire()
                .await
                .map_err(|e| LoadError::fetch(key, e))?
                .forget();
        }

        let body = self.docs.lock().get(key).cloned();
        body.map(String::into_bytes).ok_or_else(|| LoadError::Status {
            path: key.to_string(),
            status: 404,
        })
    }
}
