use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use strand_task::Cost;
use strand_types::Address;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::Storage;

/// Composite store that dispatches on the address scheme.
///
/// Reads go to the backend registered for the address's scheme. Writes go
/// to the default backend, so every address a `MultiStorage` hands out is
/// resolvable by it. A scheme with no registered backend fails with
/// [`StoreError::UnknownProtocol`].
#[derive(Clone)]
pub struct MultiStorage {
    backends: HashMap<String, Arc<dyn Storage>>,
    default_scheme: String,
}

impl MultiStorage {
    /// Create a composite whose writes go to `default`.
    pub fn new(default: Arc<dyn Storage>) -> Self {
        let default_scheme = default.scheme().to_string();
        let mut backends = HashMap::new();
        backends.insert(default_scheme.clone(), default);
        Self {
            backends,
            default_scheme,
        }
    }

    /// Register `backend` for its own scheme, replacing any previous one.
    pub fn register(&mut self, backend: Arc<dyn Storage>) {
        let scheme = backend.scheme().to_string();
        debug!(scheme = %scheme, "storage backend registered");
        self.backends.insert(scheme, backend);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, backend: Arc<dyn Storage>) -> Self {
        self.register(backend);
        self
    }

    /// Make the already-registered `scheme` the write target.
    pub fn set_default(&mut self, scheme: &str) -> StoreResult<()> {
        let scheme = scheme.to_ascii_lowercase();
        if !self.backends.contains_key(&scheme) {
            return Err(StoreError::UnknownProtocol { scheme });
        }
        self.default_scheme = scheme;
        Ok(())
    }

    /// Backend registered for `scheme`.
    pub fn backend(&self, scheme: &str) -> StoreResult<&Arc<dyn Storage>> {
        self.backends
            .get(scheme)
            .ok_or_else(|| StoreError::UnknownProtocol {
                scheme: scheme.to_string(),
            })
    }

    pub fn schemes(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }

    fn default_backend(&self) -> StoreResult<&Arc<dyn Storage>> {
        self.backend(&self.default_scheme)
    }

    fn resolve(&self, address: &Address) -> StoreResult<&Arc<dyn Storage>> {
        self.backend(address.scheme())
    }
}

#[async_trait]
impl Storage for MultiStorage {
    fn scheme(&self) -> &str {
        &self.default_scheme
    }

    async fn write_data(&self, data: &[u8]) -> StoreResult<Address> {
        self.default_backend()?.write_data(data).await
    }

    async fn read_data(&self, address: &Address) -> StoreResult<Vec<u8>> {
        self.resolve(address)?.read_data(address).await
    }

    async fn write_object(&self, value: &Value) -> StoreResult<Address> {
        self.default_backend()?.write_object(value).await
    }

    async fn read_object(&self, address: &Address) -> StoreResult<Value> {
        self.resolve(address)?.read_object(address).await
    }

    fn write_cost(&self, len: usize) -> Cost {
        match self.default_backend() {
            Ok(backend) => backend.write_cost(len),
            Err(_) => Cost::storage_write(len as u64),
        }
    }
}

impl std::fmt::Debug for MultiStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut schemes: Vec<_> = self.schemes().collect();
        schemes.sort_unstable();
        f.debug_struct("MultiStorage")
            .field("schemes", &schemes)
            .field("default_scheme", &self.default_scheme)
            .finish()
    }
}
