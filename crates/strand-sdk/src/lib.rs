//! High-level SDK for Strand.
//!
//! [`Strand`] is the entry point for applications: it reads a
//! [`StrandConfig`], wires the stores, the registry and the chain engine, and
//! hands out tasks for every handle operation.

pub mod config;
pub mod error;
pub mod strand;

pub use config::{RegistryConfig, RegistryKind, StorageConfig, StrandConfig};
pub use error::{SdkError, SdkResult};
pub use strand::Strand;

// Re-export key types
pub use strand_chain::{ChainContext, ChainEngine, ChainError, ChainTask, EngineConfig};
pub use strand_registry::{FeeSchedule, Registry, RegistryTask};
pub use strand_task::{Cost, Task};
pub use strand_types::{Address, ChainEntry, HandleChain, Identity, Meta, Uuid};
