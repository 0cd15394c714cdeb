//! The Strand chain engine.
//!
//! A handle's history is a chain of immutable [`ChainNode`](strand_types::ChainNode)s
//! in content-addressed storage, linked newest to oldest through their
//! `previous` field. The registry holds only the address of the newest node.
//!
//! Appending is cheap: write the content, write one node pointing at the old
//! head, move the pointer. Editing or removing an older entry is not: every
//! node newer than the edit has to be rewritten, because changing a node's
//! predecessor changes its own address. The [`rebuild`] module plans that
//! rewrite; the [`ChainEngine`] runs it.
//!
//! Every operation is handed out as a [`ChainTask`], so callers can price it
//! before running it.
//!
//! # Concurrency
//!
//! The registry offers no compare-and-swap on the pointer. Two mutations of
//! the same handle running at once can both build on the same old head, and
//! the later pointer update silently discards the earlier one. Set
//! [`EngineConfig::serialize_mutations`] to run mutations of one handle one
//! at a time within an engine; nothing coordinates separate engines.

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod loader;
mod locks;
pub mod rebuild;
mod writes;

pub use config::EngineConfig;
pub use context::ChainContext;
pub use engine::{ChainEngine, ChainTask};
pub use error::{ChainError, ChainResult};
pub use loader::{load_chain, LoadedChain};
pub use rebuild::{Edit, RebuildPlan};
