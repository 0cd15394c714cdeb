//! Handle registry for Strand.
//!
//! The registry is the only mutable part of a Strand deployment. It maps a
//! handle name to a [`HandleRecord`]: the address of the handle's chain head
//! (its *pointer*), a free-form profile, and the identity that owns it.
//!
//! # Modules
//!
//! - [`error`] -- Error types for registry operations
//! - [`types`] -- [`HandleRecord`] and the [`RegistryOp`]s that change it
//! - [`state`] -- The authorization rules shared by every backend
//! - [`pricing`] -- [`FeeSchedule`] for the reference backends
//! - [`traits`] -- The [`RegistryBackend`] trait
//! - [`memory`] -- In-memory [`InMemoryRegistry`] for tests
//! - [`file`] -- [`FileRegistry`] persisted as JSON
//! - [`client`] -- [`Registry`], which wraps every call as a task

pub mod client;
pub mod error;
pub mod file;
pub mod memory;
pub mod pricing;
pub mod state;
pub mod traits;
pub mod types;

pub use client::{Registry, RegistryContext, RegistryTask};
pub use error::{RegistryError, RegistryResult};
pub use file::FileRegistry;
pub use memory::InMemoryRegistry;
pub use pricing::FeeSchedule;
pub use state::RegistryState;
pub use traits::RegistryBackend;
pub use types::{HandleRecord, RegistryOp};
