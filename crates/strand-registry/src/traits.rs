//! The [`RegistryBackend`] trait defining the registry interface.

use async_trait::async_trait;
use strand_task::Cost;
use strand_types::Identity;

use crate::error::RegistryResult;
use crate::types::{HandleRecord, RegistryOp};

/// Storage backend for handle records.
///
/// Implementations must be thread-safe (`Send + Sync`). Every state change
/// goes through [`apply`](Self::apply), which authorizes the caller and
/// charges the fee [`simulate`](Self::simulate) reports for the same op.
#[async_trait]
pub trait RegistryBackend: Send + Sync {
    /// Read a handle's record.
    ///
    /// Returns `Ok(None)` if the handle is not registered.
    async fn record(&self, handle: &str) -> RegistryResult<Option<HandleRecord>>;

    /// Price `op` as if `caller` submitted it, without applying it.
    ///
    /// Fails with the error `apply` would return if the op is not allowed.
    async fn simulate(&self, caller: &Identity, op: &RegistryOp) -> RegistryResult<Cost>;

    /// Apply `op` on behalf of `caller`, returning the fee charged.
    async fn apply(&self, caller: &Identity, op: &RegistryOp) -> RegistryResult<Cost>;
}
