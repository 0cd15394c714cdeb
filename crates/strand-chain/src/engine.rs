use std::sync::Arc;

use strand_registry::Registry;
use strand_store::Storage;
use strand_task::{create_task, Context, Cost, Operations, Task};
use strand_types::{Address, ChainNode, Clock, HandleChain, Meta, SystemClock, Uuid};
use tokio::sync::OwnedMutexGuard;
use tracing::info;

use crate::config::EngineConfig;
use crate::context::ChainContext;
use crate::error::{ChainError, ChainResult};
use crate::loader::{load_chain, LoadedChain};
use crate::locks::HandleLocks;
use crate::rebuild::{Edit, RebuildPlan};
use crate::writes::Writes;

/// A task produced by the [`ChainEngine`].
pub type ChainTask<R> = Task<ChainContext, R, ChainError>;

/// Builds tasks that read and mutate handle chains.
///
/// Every mutation follows the same shape: stage the storage writes, then
/// move the registry pointer. The pointer update is always the last write,
/// so a failure anywhere leaves the handle as it was (plus, possibly, some
/// unreferenced objects in storage).
///
/// Estimating a mutation stages the same steps against a dry run: reads are
/// performed, writes are only priced.
#[derive(Clone)]
pub struct ChainEngine {
    storage: Arc<dyn Storage>,
    registry: Registry,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    locks: Arc<HandleLocks>,
}

/// A chain mutation, as captured by its task.
enum Mutation {
    Push {
        content: Vec<u8>,
        meta: Meta,
    },
    Replace {
        uuid: Uuid,
        content: Vec<u8>,
        meta: Meta,
    },
    Remove {
        uuid: Uuid,
    },
}

impl Mutation {
    fn label(&self) -> &'static str {
        match self {
            Self::Push { .. } => "chain.push",
            Self::Replace { .. } => "chain.replace",
            Self::Remove { .. } => "chain.remove",
        }
    }
}

impl ChainEngine {
    pub fn new(storage: Arc<dyn Storage>, registry: Registry) -> Self {
        Self {
            storage,
            registry,
            clock: Arc::new(SystemClock),
            config: EngineConfig::default(),
            locks: Arc::new(HandleLocks::default()),
        }
    }

    /// Use `clock` for new node timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register `handle` to the engine's identity. The chain starts empty.
    pub fn register_handle(&self, handle: &str) -> ChainTask<()> {
        let inner = self.registry.register(handle);

        let estimate = {
            let inner = inner.clone();
            move |_ctx: Context<ChainContext>| {
                let inner = inner.clone();
                async move {
                    inner
                        .estimate()
                        .await
                        .map_err(|e| ChainError::from(e).into_estimation())
                }
            }
        };
        let execute = move |ctx: Context<ChainContext>| {
            let inner = inner.clone();
            async move {
                inner.execute().await?;
                let handle = ctx.read(|c| c.handle.clone());
                info!(handle = %handle, "handle registered");
                Ok(())
            }
        };

        create_task(
            Operations::new(estimate, execute),
            ChainContext::for_handle(handle),
        )
        .labelled("chain.register")
    }

    /// Read `handle`'s chain, newest entry first.
    pub fn load_handle(&self, handle: &str) -> ChainTask<HandleChain> {
        let engine = self.clone();
        let ops = Operations::free(move |ctx: Context<ChainContext>| {
            let engine = engine.clone();
            async move {
                let handle = ctx.read(|c| c.handle.clone());
                let chain = engine.load(&handle).await?.to_chain();
                ctx.update(|c| c.record_chain(&chain));
                Ok(chain)
            }
        });
        create_task(ops, ChainContext::for_handle(handle)).labelled("chain.load")
    }

    /// Append `content` as the new head of `handle`.
    pub fn push_to_handle(
        &self,
        handle: &str,
        content: impl Into<Vec<u8>>,
        meta: Meta,
    ) -> ChainTask<HandleChain> {
        self.mutation_task(
            handle,
            Mutation::Push {
                content: content.into(),
                meta,
            },
        )
    }

    /// Replace the content and meta of the entry `uuid`.
    ///
    /// The entry keeps its uuid, timestamp and position. Fails with
    /// [`ChainError::NotFound`] if `uuid` is not in the chain.
    pub fn replace_from_handle(
        &self,
        handle: &str,
        uuid: Uuid,
        content: impl Into<Vec<u8>>,
        meta: Meta,
    ) -> ChainTask<HandleChain> {
        self.mutation_task(
            handle,
            Mutation::Replace {
                uuid,
                content: content.into(),
                meta,
            },
        )
    }

    /// Remove the entry `uuid`. Fails with [`ChainError::NotFound`] if it is
    /// not in the chain.
    pub fn remove_from_handle(&self, handle: &str, uuid: Uuid) -> ChainTask<HandleChain> {
        self.mutation_task(handle, Mutation::Remove { uuid })
    }

    /// Bytes behind an entry's content address.
    pub async fn read_content(&self, address: &Address) -> ChainResult<Vec<u8>> {
        Ok(self.storage.read_data(address).await?)
    }

    fn mutation_task(&self, handle: &str, mutation: Mutation) -> ChainTask<HandleChain> {
        let label = mutation.label();
        let mutation = Arc::new(mutation);

        let estimate = {
            let engine = self.clone();
            let mutation = Arc::clone(&mutation);
            move |ctx: Context<ChainContext>| {
                let engine = engine.clone();
                let mutation = Arc::clone(&mutation);
                async move {
                    let handle = ctx.read(|c| c.handle.clone());
                    engine
                        .estimate_mutation(&handle, &mutation)
                        .await
                        .map_err(ChainError::into_estimation)
                }
            }
        };
        let execute = {
            let engine = self.clone();
            move |ctx: Context<ChainContext>| {
                let engine = engine.clone();
                let mutation = Arc::clone(&mutation);
                async move { engine.execute_mutation(&ctx, &mutation).await }
            }
        };

        create_task(
            Operations::new(estimate, execute),
            ChainContext::for_handle(handle),
        )
        .labelled(label)
    }

    async fn estimate_mutation(&self, handle: &str, mutation: &Mutation) -> ChainResult<Cost> {
        let mut writes = Writes::dry_run(self.storage.as_ref());
        let chain = self.stage(handle, mutation, &mut writes).await?;
        let fee = self
            .registry
            .set_pointer(handle, chain.head)
            .estimate()
            .await?;
        Ok(writes.cost() + fee)
    }

    async fn execute_mutation(
        &self,
        ctx: &Context<ChainContext>,
        mutation: &Mutation,
    ) -> ChainResult<HandleChain> {
        let handle = ctx.read(|c| c.handle.clone());
        let _guard = self.mutation_guard(&handle).await;

        let mut writes = Writes::commit(self.storage.as_ref());
        let staged = self.stage(&handle, mutation, &mut writes).await;
        ctx.update(|c| c.written = writes.written().to_vec());
        let chain = staged?;

        self.registry
            .set_pointer(&handle, chain.head.clone())
            .execute()
            .await?;
        info!(
            handle = %handle,
            op = mutation.label(),
            head = ?chain.head.as_ref().map(Address::short),
            length = chain.len(),
            writes = writes.written().len(),
            "pointer committed"
        );

        ctx.update(|c| {
            c.record_chain(&chain);
            c.committed = true;
        });
        Ok(chain)
    }

    /// Perform (or price) every storage write of `mutation` and return the
    /// chain the pointer should move to.
    async fn stage(
        &self,
        handle: &str,
        mutation: &Mutation,
        writes: &mut Writes<'_>,
    ) -> ChainResult<HandleChain> {
        match mutation {
            Mutation::Push { content, meta } => {
                let content = writes.data(content).await?;
                let below = self.load(handle).await?;
                let (uuid, timestamp) = match writes {
                    Writes::Commit { .. } => (Uuid::now_v7(), self.clock.now_ms()),
                    // Same serialized length as the real thing.
                    Writes::DryRun { .. } => (Uuid::nil(), self.clock.peek_ms()),
                };
                let node = ChainNode {
                    content,
                    uuid,
                    timestamp,
                    meta: meta.clone(),
                    previous: below.head.clone(),
                };
                let head = writes.node(&node).await?;

                let mut entries = Vec::with_capacity(below.nodes.len() + 1);
                entries.push(node.entry());
                entries.extend(below.nodes.iter().map(|(_, node)| node.entry()));
                Ok(HandleChain {
                    head: Some(head),
                    entries,
                })
            }
            Mutation::Replace {
                uuid,
                content,
                meta,
            } => {
                let chain = self.load(handle).await?;
                let index = locate(&chain, handle, uuid)?;
                let content = writes.data(content).await?;
                let edit = Edit::Replace {
                    content,
                    meta: meta.clone(),
                };
                Ok(RebuildPlan::new(&chain, index, edit).apply(writes).await?)
            }
            Mutation::Remove { uuid } => {
                let chain = self.load(handle).await?;
                let index = locate(&chain, handle, uuid)?;
                Ok(RebuildPlan::new(&chain, index, Edit::Remove)
                    .apply(writes)
                    .await?)
            }
        }
    }

    async fn load(&self, handle: &str) -> ChainResult<LoadedChain> {
        let head = self.registry.get_pointer(handle).execute().await?;
        load_chain(self.storage.as_ref(), head).await
    }

    async fn mutation_guard(&self, handle: &str) -> Option<OwnedMutexGuard<()>> {
        if self.config.serialize_mutations {
            Some(self.locks.acquire(handle).await)
        } else {
            None
        }
    }
}

fn locate(chain: &LoadedChain, handle: &str, uuid: &Uuid) -> ChainResult<usize> {
    chain.position(uuid).ok_or_else(|| ChainError::NotFound {
        handle: handle.to_string(),
    })
}

impl std::fmt::Debug for ChainEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainEngine")
            .field("storage", &self.storage.scheme())
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
