use std::sync::Arc;

use serde_json::Value;
use strand_chain::{ChainEngine, ChainTask};
use strand_registry::{FileRegistry, InMemoryRegistry, Registry, RegistryBackend, RegistryTask};
use strand_store::{DirectoryStorage, InMemoryStorage, MultiStorage, Storage};
use strand_types::{Address, Clock, HandleChain, Identity, Meta, Uuid};
use tracing::debug;

use crate::config::{RegistryKind, StrandConfig};
use crate::error::{SdkError, SdkResult};

/// High-level Strand API.
///
/// Wires the stores, the registry and the chain engine described by a
/// [`StrandConfig`]. Every operation returns a task, as the engine does.
pub struct Strand {
    engine: ChainEngine,
    config: StrandConfig,
}

impl Strand {
    /// Open the deployment described by `config`.
    ///
    /// Both the `file` and `mem` schemes are readable; writes go to
    /// `storage.default_scheme`.
    pub fn open(config: StrandConfig) -> SdkResult<Self> {
        let identity = Identity::new(config.identity.clone())?;

        let disk: Arc<dyn Storage> = Arc::new(DirectoryStorage::new(&config.storage.root));
        let mut storage = MultiStorage::new(disk).with(Arc::new(InMemoryStorage::new()));
        storage
            .set_default(&config.storage.default_scheme)
            .map_err(|_| {
                SdkError::Config(format!(
                    "unknown storage scheme {:?}, expected \"file\" or \"mem\"",
                    config.storage.default_scheme
                ))
            })?;

        let backend: Arc<dyn RegistryBackend> = match config.registry.backend {
            RegistryKind::Memory => Arc::new(InMemoryRegistry::with_fees(config.registry.fees)),
            RegistryKind::File => Arc::new(FileRegistry::with_fees(
                &config.registry.path,
                config.registry.fees,
            )),
        };

        debug!(
            identity = %identity,
            storage = ?storage,
            registry = ?config.registry.backend,
            "strand opened"
        );

        let engine = ChainEngine::new(Arc::new(storage), Registry::new(backend, identity))
            .with_config(config.engine.clone());
        Ok(Self { engine, config })
    }

    /// A throwaway deployment held entirely in memory.
    pub fn in_memory(identity: &str) -> SdkResult<Self> {
        Self::open(StrandConfig::in_memory(identity))
    }

    /// Use `clock` for new node timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.engine = self.engine.with_clock(clock);
        self
    }

    pub fn engine(&self) -> &ChainEngine {
        &self.engine
    }

    pub fn registry(&self) -> &Registry {
        self.engine.registry()
    }

    pub fn config(&self) -> &StrandConfig {
        &self.config
    }

    pub fn identity(&self) -> &Identity {
        self.registry().caller()
    }

    // ---- Chain operations ----

    pub fn register(&self, handle: &str) -> ChainTask<()> {
        self.engine.register_handle(handle)
    }

    pub fn load(&self, handle: &str) -> ChainTask<HandleChain> {
        self.engine.load_handle(handle)
    }

    pub fn push(
        &self,
        handle: &str,
        content: impl Into<Vec<u8>>,
        meta: Meta,
    ) -> ChainTask<HandleChain> {
        self.engine.push_to_handle(handle, content, meta)
    }

    pub fn replace(
        &self,
        handle: &str,
        uuid: Uuid,
        content: impl Into<Vec<u8>>,
        meta: Meta,
    ) -> ChainTask<HandleChain> {
        self.engine.replace_from_handle(handle, uuid, content, meta)
    }

    pub fn remove(&self, handle: &str, uuid: Uuid) -> ChainTask<HandleChain> {
        self.engine.remove_from_handle(handle, uuid)
    }

    pub async fn read_content(&self, address: &Address) -> SdkResult<Vec<u8>> {
        Ok(self.engine.read_content(address).await?)
    }

    // ---- Handle metadata ----

    pub fn profile(&self, handle: &str) -> RegistryTask<Value> {
        self.registry().get_profile(handle)
    }

    pub fn set_profile(&self, handle: &str, profile: Value) -> RegistryTask<()> {
        self.registry().set_profile(handle, profile)
    }

    pub fn owner(&self, handle: &str) -> RegistryTask<Option<Identity>> {
        self.registry().get_owner(handle)
    }

    pub fn set_owner(&self, handle: &str, owner: Identity) -> RegistryTask<()> {
        self.registry().set_owner(handle, owner)
    }
}

impl std::fmt::Debug for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strand")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
