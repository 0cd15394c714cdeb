//! Task-producing registry client.

use std::sync::Arc;

use serde_json::Value;
use strand_task::{create_task, Context, Cost, Memo, Operations, Task};
use strand_types::{Address, Identity};

use crate::error::{RegistryError, RegistryResult};
use crate::traits::RegistryBackend;
use crate::types::{HandleRecord, RegistryOp};

/// Observable state of a registry task.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistryContext {
    pub handle: String,
    /// Fee the op was priced at, once simulated.
    pub fee: Option<u64>,
    /// Set once the op has been applied.
    pub applied: bool,
}

pub type RegistryTask<R> = Task<RegistryContext, R, RegistryError>;

/// A registry backend bound to the identity submitting ops.
///
/// Every method returns a [`Task`]. Getters are free to estimate. Setters
/// simulate their fee at most once per task, on the first of estimate or
/// execute, and reuse it afterwards.
#[derive(Clone)]
pub struct Registry {
    backend: Arc<dyn RegistryBackend>,
    caller: Identity,
}

impl Registry {
    pub fn new(backend: Arc<dyn RegistryBackend>, caller: Identity) -> Self {
        Self { backend, caller }
    }

    pub fn caller(&self) -> &Identity {
        &self.caller
    }

    pub fn backend(&self) -> &Arc<dyn RegistryBackend> {
        &self.backend
    }

    /// The same backend acting as `caller`.
    pub fn acting_as(&self, caller: Identity) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            caller,
        }
    }

    /// Price `op` for this caller, reporting any refusal as an estimation error.
    pub async fn simulate(&self, op: &RegistryOp) -> RegistryResult<Cost> {
        self.backend
            .simulate(&self.caller, op)
            .await
            .map_err(RegistryError::into_estimation)
    }

    pub fn register(&self, handle: &str) -> RegistryTask<()> {
        self.setter(RegistryOp::Register {
            handle: handle.to_string(),
        })
    }

    pub fn get_pointer(&self, handle: &str) -> RegistryTask<Option<Address>> {
        self.getter(handle, |record| record.and_then(|r| r.pointer))
    }

    /// Set the pointer; `None` empties the handle.
    pub fn set_pointer(&self, handle: &str, pointer: Option<Address>) -> RegistryTask<()> {
        self.setter(RegistryOp::SetPointer {
            handle: handle.to_string(),
            pointer,
        })
    }

    /// The profile; `Value::Null` if unset or unregistered.
    pub fn get_profile(&self, handle: &str) -> RegistryTask<Value> {
        self.getter(handle, |record| record.map(|r| r.profile).unwrap_or_default())
    }

    pub fn set_profile(&self, handle: &str, profile: Value) -> RegistryTask<()> {
        self.setter(RegistryOp::SetProfile {
            handle: handle.to_string(),
            profile,
        })
    }

    pub fn get_owner(&self, handle: &str) -> RegistryTask<Option<Identity>> {
        self.getter(handle, |record| record.map(|r| r.owner))
    }

    pub fn set_owner(&self, handle: &str, owner: Identity) -> RegistryTask<()> {
        self.setter(RegistryOp::SetOwner {
            handle: handle.to_string(),
            owner,
        })
    }

    fn getter<R, F>(&self, handle: &str, project: F) -> RegistryTask<R>
    where
        R: Send + 'static,
        F: Fn(Option<HandleRecord>) -> R + Send + Sync + 'static,
    {
        let backend = Arc::clone(&self.backend);
        let project = Arc::new(project);
        let name = handle.to_string();

        let ops = Operations::free(move |ctx: Context<RegistryContext>| {
            let backend = Arc::clone(&backend);
            let project = Arc::clone(&project);
            async move {
                let handle = ctx.read(|c| c.handle.clone());
                let record = backend.record(&handle).await?;
                Ok(project(record))
            }
        });
        create_task(
            ops,
            RegistryContext {
                handle: name,
                ..RegistryContext::default()
            },
        )
        .labelled("registry.get")
    }

    fn setter(&self, op: RegistryOp) -> RegistryTask<()> {
        let label = format!("registry.{}", op.name());
        let handle = op.handle().to_string();
        let fee: Memo<Cost> = Memo::new();
        let op = Arc::new(op);

        let estimate = {
            let backend = Arc::clone(&self.backend);
            let caller = self.caller.clone();
            let op = Arc::clone(&op);
            let fee = fee.clone();
            move |ctx: Context<RegistryContext>| {
                let backend = Arc::clone(&backend);
                let caller = caller.clone();
                let op = Arc::clone(&op);
                let fee = fee.clone();
                async move {
                    let cost = fee
                        .get_or_try_init(|| backend.simulate(&caller, &op))
                        .await
                        .map_err(RegistryError::into_estimation)?;
                    ctx.update(|c| c.fee = Some(cost.fee));
                    Ok(cost)
                }
            }
        };

        let execute = {
            let backend = Arc::clone(&self.backend);
            let caller = self.caller.clone();
            let fee = fee.clone();
            move |ctx: Context<RegistryContext>| {
                let backend = Arc::clone(&backend);
                let caller = caller.clone();
                let op = Arc::clone(&op);
                let fee = fee.clone();
                async move {
                    let cost = fee
                        .get_or_try_init(|| backend.simulate(&caller, &op))
                        .await?;
                    backend.apply(&caller, &op).await?;
                    ctx.update(|c| {
                        c.fee = Some(cost.fee);
                        c.applied = true;
                    });
                    Ok(())
                }
            }
        };

        create_task(
            Operations::new(estimate, execute),
            RegistryContext {
                handle,
                ..RegistryContext::default()
            },
        )
        .labelled(label)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("caller", &self.caller)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryRegistry;
    use serde_json::json;

    fn alice() -> Identity {
        Identity::new("alice").unwrap()
    }

    fn registry() -> (Arc<InMemoryRegistry>, Registry) {
        let backend = Arc::new(InMemoryRegistry::new());
        let client = Registry::new(backend.clone(), alice());
        (backend, client)
    }

    #[tokio::test]
    async fn register_then_get_pointer_is_empty() {
        let (_, client) = registry();
        client.register("news").execute().await.unwrap();
        assert_eq!(client.get_pointer("news").execute().await.unwrap(), None);
        assert_eq!(
            client.get_owner("news").execute().await.unwrap(),
            Some(alice())
        );
    }

    #[tokio::test]
    async fn getters_on_unknown_handle() {
        let (_, client) = registry();
        assert_eq!(client.get_pointer("ghost").execute().await.unwrap(), None);
        assert_eq!(client.get_profile("ghost").execute().await.unwrap(), Value::Null);
        assert_eq!(client.get_owner("ghost").execute().await.unwrap(), None);
        assert!(client.get_owner("ghost").estimate().await.unwrap().is_zero());
    }

    #[tokio::test]
    async fn setter_estimate_matches_fee_and_has_no_effect() {
        let (backend, client) = registry();
        client.register("news").execute().await.unwrap();

        let task = client.set_profile("news", json!({"a": 1}));
        assert_eq!(task.estimate().await.unwrap(), Cost::fee(17));
        assert_eq!(task.context().snapshot().fee, Some(17));
        assert!(!task.context().snapshot().applied);
        assert_eq!(client.get_profile("news").execute().await.unwrap(), Value::Null);

        task.execute().await.unwrap();
        assert!(task.context().snapshot().applied);
        assert_eq!(
            client.get_profile("news").execute().await.unwrap(),
            json!({"a": 1})
        );
        assert_eq!(backend.fees_charged(), 100 + 17);
    }

    #[tokio::test]
    async fn setter_estimate_failure_is_estimation_error() {
        let (_, client) = registry();
        let task = client.set_pointer("ghost", None);
        assert!(matches!(
            task.estimate().await,
            Err(RegistryError::Estimation { .. })
        ));
    }

    #[tokio::test]
    async fn setter_execute_failure_is_verbatim() {
        let (_, client) = registry();
        client.register("news").execute().await.unwrap();
        let bob = client.acting_as(Identity::new("bob").unwrap());
        let err = bob
            .set_pointer("news", Some(Address::parse("mem://x").unwrap()))
            .execute()
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn set_pointer_and_owner() {
        let (_, client) = registry();
        client.register("news").execute().await.unwrap();
        let head = Address::parse("mem://head").unwrap();
        client
            .set_pointer("news", Some(head.clone()))
            .execute()
            .await
            .unwrap();
        assert_eq!(client.get_pointer("news").execute().await.unwrap(), Some(head));

        let bob = Identity::new("bob").unwrap();
        client.set_owner("news", bob.clone()).execute().await.unwrap();
        assert_eq!(client.get_owner("news").execute().await.unwrap(), Some(bob));
    }

    #[tokio::test]
    async fn reexecute_reapplies_with_cached_fee() {
        let (backend, client) = registry();
        client.register("news").execute().await.unwrap();
        let task = client.set_pointer("news", None);
        task.execute().await.unwrap();
        task.execute().await.unwrap();
        assert_eq!(backend.fees_charged(), 100 + 10 + 10);
    }
}
