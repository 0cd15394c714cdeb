//! In-memory registry for testing and ephemeral use.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use strand_task::Cost;
use strand_types::Identity;
use tracing::debug;

use crate::error::RegistryResult;
use crate::pricing::FeeSchedule;
use crate::state::RegistryState;
use crate::traits::RegistryBackend;
use crate::types::{HandleRecord, RegistryOp};

/// An in-memory implementation of [`RegistryBackend`].
///
/// Data is lost when the registry is dropped.
#[derive(Debug)]
pub struct InMemoryRegistry {
    state: RwLock<RegistryState>,
    fees: FeeSchedule,
    fees_charged: AtomicU64,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::with_fees(FeeSchedule::default())
    }

    pub fn with_fees(fees: FeeSchedule) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            fees,
            fees_charged: AtomicU64::new(0),
        }
    }

    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    /// Sum of all fees charged so far.
    pub fn fees_charged(&self) -> u64 {
        self.fees_charged.load(Ordering::Relaxed)
    }

    /// A copy of every record.
    pub fn snapshot(&self) -> RegistryState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistryBackend for InMemoryRegistry {
    async fn record(&self, handle: &str) -> RegistryResult<Option<HandleRecord>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state.record(handle).cloned())
    }

    async fn simulate(&self, caller: &Identity, op: &RegistryOp) -> RegistryResult<Cost> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.check(caller, op)?;
        self.fees.price(op)
    }

    async fn apply(&self, caller: &Identity, op: &RegistryOp) -> RegistryResult<Cost> {
        let cost = self.fees.price(op)?;
        let changed = self
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(caller, op)?;
        self.fees_charged.fetch_add(cost.fee, Ordering::Relaxed);
        debug!(
            op = op.name(),
            handle = op.handle(),
            caller = %caller,
            fee = cost.fee,
            changed,
            "registry op applied"
        );
        Ok(cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use strand_types::Address;

    fn alice() -> Identity {
        Identity::new("alice").unwrap()
    }

    #[tokio::test]
    async fn apply_then_read() {
        let registry = InMemoryRegistry::new();
        registry
            .apply(&alice(), &RegistryOp::Register { handle: "news".into() })
            .await
            .unwrap();
        let pointer = Address::parse("mem://head").unwrap();
        registry
            .apply(
                &alice(),
                &RegistryOp::SetPointer {
                    handle: "news".into(),
                    pointer: Some(pointer.clone()),
                },
            )
            .await
            .unwrap();

        let record = registry.record("news").await.unwrap().unwrap();
        assert_eq!(record.pointer, Some(pointer));
        assert_eq!(registry.fees_charged(), 110);
    }

    #[tokio::test]
    async fn simulate_has_no_effect() {
        let registry = InMemoryRegistry::new();
        let op = RegistryOp::Register { handle: "news".into() };
        assert_eq!(registry.simulate(&alice(), &op).await.unwrap(), Cost::fee(100));
        assert!(registry.record("news").await.unwrap().is_none());
        assert_eq!(registry.fees_charged(), 0);
    }

    #[tokio::test]
    async fn simulate_reports_failures() {
        let registry = InMemoryRegistry::new();
        let op = RegistryOp::SetPointer {
            handle: "news".into(),
            pointer: None,
        };
        assert!(matches!(
            registry.simulate(&alice(), &op).await,
            Err(RegistryError::HandleNotRegistered { .. })
        ));
    }

    #[tokio::test]
    async fn failed_apply_charges_nothing() {
        let registry = InMemoryRegistry::new();
        let op = RegistryOp::SetOwner {
            handle: "news".into(),
            owner: alice(),
        };
        assert!(registry.apply(&alice(), &op).await.is_err());
        assert_eq!(registry.fees_charged(), 0);
    }
}
