use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use strand_types::Address;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::traits::{check_scheme, Storage};

/// Scheme used by [`InMemoryStorage::new`].
pub const MEMORY_SCHEME: &str = "mem";

/// In-memory, HashMap-based store.
///
/// Intended for tests and embedding. All objects are held in memory behind a
/// `RwLock` for safe concurrent access. Objects are cloned on read/write.
pub struct InMemoryStorage {
    scheme: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl InMemoryStorage {
    /// Create a new empty store answering to the `mem` scheme.
    pub fn new() -> Self {
        Self::with_scheme(MEMORY_SCHEME)
    }

    /// Create a new empty store answering to `scheme`.
    pub fn with_scheme(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into().to_ascii_lowercase(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes across all stored objects.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(StoredObject::size)
            .sum()
    }

    /// Returns `true` if an object of any kind is stored at `address`.
    pub fn contains(&self, address: &Address) -> bool {
        address.scheme() == self.scheme
            && self
                .objects
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(address.payload())
    }

    fn put(&self, object: StoredObject) -> StoreResult<Address> {
        let digest = object.digest();
        let address = Address::new(&self.scheme, digest.clone())?;
        let size = object.size();
        let mut map = self.objects.write().unwrap_or_else(PoisonError::into_inner);
        // Same digest means same bytes; keep the existing copy.
        map.entry(digest).or_insert(object);
        debug!(address = %address.short(), size, "object stored in memory");
        Ok(address)
    }

    fn get(&self, address: &Address, expected: ObjectKind) -> StoreResult<StoredObject> {
        check_scheme(&self.scheme, address)?;
        let map = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        let object = map
            .get(address.payload())
            .ok_or_else(|| StoreError::NotFound(address.clone()))?;
        if object.kind != expected {
            return Err(StoreError::KindMismatch {
                address: address.clone(),
                expected,
                found: object.kind,
            });
        }
        Ok(object.clone())
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    async fn write_data(&self, data: &[u8]) -> StoreResult<Address> {
        self.put(StoredObject::data(data.to_vec()))
    }

    async fn read_data(&self, address: &Address) -> StoreResult<Vec<u8>> {
        Ok(self.get(address, ObjectKind::Data)?.bytes)
    }

    async fn write_object(&self, value: &Value) -> StoreResult<Address> {
        self.put(StoredObject::object(value)?)
    }

    async fn read_object(&self, address: &Address) -> StoreResult<Value> {
        self.get(address, ObjectKind::Object)?.decode_object()
    }
}

impl std::fmt::Debug for InMemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStorage")
            .field("scheme", &self.scheme)
            .field("object_count", &self.len())
            .finish()
    }
}
