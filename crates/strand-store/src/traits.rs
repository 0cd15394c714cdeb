use async_trait::async_trait;
use serde_json::Value;
use strand_task::Cost;
use strand_types::Address;

use crate::error::{StoreError, StoreResult};
use crate::object::encode_object;

/// Content-addressed byte and object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. The returned address is a
///   deterministic function of the written bytes, so writing the same bytes
///   twice yields the same address.
/// - A write returns only once its address is known and the object is
///   readable through that address.
/// - Data written with [`write_data`](Self::write_data) and objects written
///   with [`write_object`](Self::write_object) live in separate namespaces.
/// - Concurrent reads are always safe.
/// - All I/O errors are propagated, never silently ignored.
#[async_trait]
pub trait Storage: Send + Sync {
    /// The address scheme this store writes, e.g. `mem` or `file`.
    fn scheme(&self) -> &str;

    /// Store raw bytes.
    async fn write_data(&self, data: &[u8]) -> StoreResult<Address>;

    /// Read raw bytes previously stored with `write_data`.
    async fn read_data(&self, address: &Address) -> StoreResult<Vec<u8>>;

    /// Store a JSON value.
    async fn write_object(&self, value: &Value) -> StoreResult<Address>;

    /// Read a JSON value previously stored with `write_object`.
    async fn read_object(&self, address: &Address) -> StoreResult<Value>;

    /// Price of writing `len` bytes. One write of `len` bytes by default.
    fn write_cost(&self, len: usize) -> Cost {
        Cost::storage_write(len as u64)
    }

    /// Price of writing `value` as an object.
    fn object_cost(&self, value: &Value) -> StoreResult<Cost> {
        Ok(self.write_cost(encode_object(value)?.len()))
    }
}

/// Fail with [`StoreError::UnknownProtocol`] unless `address` uses `scheme`.
pub fn check_scheme(scheme: &str, address: &Address) -> StoreResult<()> {
    if address.scheme() == scheme {
        Ok(())
    } else {
        Err(StoreError::UnknownProtocol {
            scheme: address.scheme().to_string(),
        })
    }
}
